use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an item, a millisecond timestamp taken at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(pub i64);

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do entry.
///
/// This is also the persisted shape: `{"key", "text", "complete", "editing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: ItemKey,
    pub text: String,
    pub complete: bool,
    /// Transient edit-mode flag. Persisted, but optional on load.
    #[serde(default)]
    pub editing: bool,
}

impl Item {
    pub fn new(key: ItemKey, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            complete: false,
            editing: false,
        }
    }
}

/// Selection mode over the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL_FILTERS: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    /// Next filter in tab order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn matches(self, item: &Item) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !item.complete,
            Filter::Completed => item.complete,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hands out strictly increasing, time-based item keys.
///
/// Keys follow the wall clock in milliseconds. When the clock has not moved
/// past the previous key (two adds in the same millisecond, or a clock that
/// went backwards) the previous key plus one is used instead. Once the key
/// space is used up no further keys are handed out.
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    last: Option<i64>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure every future key is greater than `key`.
    pub fn observe(&mut self, key: ItemKey) {
        if self.last.is_none_or(|last| key.0 > last) {
            self.last = Some(key.0);
        }
    }

    /// Returns `None` when the previous key was `i64::MAX`.
    pub fn next_key(&mut self) -> Option<ItemKey> {
        self.next_key_at(Utc::now().timestamp_millis())
    }

    fn next_key_at(&mut self, now_millis: i64) -> Option<ItemKey> {
        let key = match self.last {
            Some(last) if now_millis <= last => last.checked_add(1)?,
            _ => now_millis,
        };
        self.last = Some(key);
        Some(ItemKey(key))
    }
}
