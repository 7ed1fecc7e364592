//! The authoritative item list and every operation that may change it.

use crate::domain::{Filter, Item, ItemKey, KeyGenerator, count_active, filter_items};
use crate::infrastructure::{encode_items, load_items};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Destination for snapshots of the item list.
///
/// `persist` must not block: the store calls it after every mutation.
pub trait Persistence {
    fn persist(&mut self, snapshot: String);
}

/// In-memory to-do list plus its derived, filtered view.
///
/// Every mutating operation recomputes the view and then hands the full
/// list to the [`Persistence`] sink.
///
/// # Examples
///
/// ```
/// use ttodo::application::{ItemStore, Persistence};
///
/// #[derive(Default)]
/// struct Discard;
/// impl Persistence for Discard {
///     fn persist(&mut self, _snapshot: String) {}
/// }
///
/// let mut store = ItemStore::new(Discard);
/// store.finish_loading(None);
/// store.set_edit_value("Buy milk");
/// store.add_item();
/// assert_eq!(store.count(), 1);
/// assert!(store.edit_value().is_empty());
/// ```
#[derive(Debug)]
pub struct ItemStore<P> {
    items: Vec<Item>,
    visible: Vec<Item>,
    filter: Filter,
    edit_value: String,
    all_complete: bool,
    loading: bool,
    keys: KeyGenerator,
    persistence: P,
}

impl<P: Persistence> ItemStore<P> {
    /// Creates an empty store that is still waiting for its initial load.
    pub fn new(persistence: P) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            filter: Filter::All,
            edit_value: String::new(),
            all_complete: false,
            loading: true,
            keys: KeyGenerator::new(),
            persistence,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items selected by the current filter.
    pub fn visible(&self) -> &[Item] {
        &self.visible
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn edit_value(&self) -> &str {
        &self.edit_value
    }

    pub fn all_complete(&self) -> bool {
        self.all_complete
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn get(&self, key: ItemKey) -> Option<&Item> {
        self.items.iter().find(|item| item.key == key)
    }

    /// Number of items not yet completed, whatever the filter.
    pub fn count(&self) -> usize {
        count_active(&self.items)
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Applies the result of the startup read and clears the loading flag.
    ///
    /// An unreadable payload is logged and treated as an empty list. Items
    /// repeating an earlier key are dropped. Nothing is written back here.
    pub fn finish_loading(&mut self, payload: Option<&str>) {
        let mut seen = HashSet::new();
        self.items = load_items(payload)
            .into_iter()
            .filter(|item| {
                let first = seen.insert(item.key);
                if !first {
                    warn!(key = %item.key, "dropping stored item with duplicate key");
                }
                first
            })
            .collect();
        for item in &self.items {
            self.keys.observe(item.key);
        }
        self.loading = false;
        self.refresh_view();
        info!(count = self.items.len(), "items loaded");
    }

    /// Sets the pending text for the next new item.
    pub fn set_edit_value(&mut self, value: impl Into<String>) {
        self.edit_value = value.into();
    }

    /// Appends the pending text as a new item. Empty text is ignored, and so
    /// is the add once no unused key is left.
    pub fn add_item(&mut self) {
        if self.edit_value.is_empty() {
            return;
        }

        let Some(key) = self.keys.next_key() else {
            warn!("no item keys left, item not added");
            return;
        };
        let text = std::mem::take(&mut self.edit_value);
        debug!(%key, "adding item");
        self.items.push(Item::new(key, text));
        self.sync();
    }

    pub fn update_text(&mut self, key: ItemKey, text: impl Into<String>) {
        let text = text.into();
        self.update(key, |item| item.text = text);
    }

    pub fn toggle_editing(&mut self, key: ItemKey, editing: bool) {
        self.update(key, |item| item.editing = editing);
    }

    pub fn toggle_complete(&mut self, key: ItemKey, complete: bool) {
        self.update(key, |item| item.complete = complete);
    }

    /// Flips the store-wide flag and writes it to every item.
    pub fn toggle_all_complete(&mut self) {
        self.all_complete = !self.all_complete;
        let complete = self.all_complete;
        debug!(complete, "setting completion on all items");
        for item in &mut self.items {
            item.complete = complete;
        }
        self.sync();
    }

    pub fn remove_item(&mut self, key: ItemKey) {
        debug!(%key, "removing item");
        self.items.retain(|item| item.key != key);
        self.sync();
    }

    /// Drops every completed item, whatever the current filter.
    pub fn clear_completed(&mut self) {
        self.items = filter_items(Filter::Active, &self.items);
        self.sync();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        debug!(%filter, "changing filter");
        self.filter = filter;
        self.sync();
    }

    /// Hands the current list to persistence again without changing it.
    pub fn flush(&mut self) {
        self.persist();
    }

    fn update(&mut self, key: ItemKey, change: impl FnOnce(&mut Item)) {
        if let Some(item) = self.items.iter_mut().find(|item| item.key == key) {
            change(item);
        }
        self.sync();
    }

    fn refresh_view(&mut self) {
        self.visible = filter_items(self.filter, &self.items);
    }

    fn sync(&mut self) {
        self.refresh_view();
        self.persist();
    }

    fn persist(&mut self) {
        match encode_items(&self.items) {
            Ok(snapshot) => self.persistence.persist(snapshot),
            Err(e) => error!(error = %e, "failed to encode items"),
        }
    }
}
