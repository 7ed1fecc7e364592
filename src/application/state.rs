//! Application state for the terminal to-do list.
//!
//! `App` wraps the [`ItemStore`] with everything the terminal front-end needs
//! on top of it: the input mode, the selected row, the text being typed, and
//! the outcome of the most recent background write.

use super::store::ItemStore;
use super::text_input::TextInput;
use crate::domain::{Filter, Item, ItemKey};
use crate::infrastructure::{StorageEvent, StorageHandle};
use tracing::{info, warn};

/// Represents the current mode of the application.
///
/// The mode decides how key presses are interpreted and which input line
/// is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigating the list
    Normal,
    /// Typing the text of a new item in the header
    Adding,
    /// Editing the text of an existing item inline
    Editing(ItemKey),
    /// Help screen is displayed
    Help,
}

/// Main application state containing the item store and UI state.
pub struct App {
    /// The to-do list and its persistence
    pub store: ItemStore<StorageHandle>,
    /// Current application mode
    pub mode: AppMode,
    /// Index of the selected row within the visible items
    pub selected: usize,
    /// Text buffer for the header or the row being edited
    pub input: TextInput,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Highest snapshot sequence the worker has confirmed as written
    pub last_saved_seq: u64,
    /// Description of the last failed write, cleared once a newer one succeeds
    pub write_error: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Creates the application and asks the storage worker for the saved list.
    ///
    /// The store stays in its loading state until the `Loaded` event arrives.
    pub fn new(mut storage: StorageHandle) -> Self {
        storage.request_load();
        Self {
            store: ItemStore::new(storage),
            mode: AppMode::Normal,
            selected: 0,
            input: TextInput::new(),
            help_scroll: 0,
            status_message: None,
            last_saved_seq: 0,
            write_error: None,
            should_quit: false,
        }
    }

    /// Applies every storage event that has arrived since the last tick.
    pub fn tick(&mut self) {
        let events = self.store.persistence_mut().poll();
        for event in events {
            self.handle_storage_event(event);
        }
    }

    pub fn handle_storage_event(&mut self, event: StorageEvent) {
        match event {
            StorageEvent::Loaded(_) if !self.store.is_loading() => {
                warn!("ignoring repeated load result");
            }
            StorageEvent::Loaded(Ok(payload)) => {
                self.store.finish_loading(payload.as_deref());
                self.clamp_selection();
            }
            StorageEvent::Loaded(Err(e)) => {
                warn!(error = %e, "could not read stored items, starting empty");
                self.store.finish_loading(None);
                self.status_message = Some(format!("Could not read saved items: {e}"));
            }
            StorageEvent::Saved { seq } => {
                self.last_saved_seq = self.last_saved_seq.max(seq);
                if self.last_saved_seq >= self.store.persistence().last_submitted() {
                    self.write_error = None;
                }
            }
            StorageEvent::SaveFailed { seq, error } => {
                if seq > self.last_saved_seq {
                    self.write_error = Some(format!("Save failed: {error}"));
                }
            }
        }
    }

    /// True while some submitted snapshot has not been confirmed as written.
    pub fn has_unsaved_changes(&self) -> bool {
        self.last_saved_seq < self.store.persistence().last_submitted()
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.store.visible().get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.store.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.store.visible().len().saturating_sub(1);
    }

    /// Keeps the selection inside the visible list after it shrinks.
    pub fn clamp_selection(&mut self) {
        let len = self.store.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Focuses the header input, keeping any text typed earlier.
    pub fn start_adding(&mut self) {
        self.mode = AppMode::Adding;
        self.input = TextInput::with_value(self.store.edit_value());
        self.status_message = None;
    }

    /// Mirrors the header buffer into the store's pending text.
    pub fn sync_pending_text(&mut self) {
        self.store.set_edit_value(self.input.value());
    }

    /// Adds the pending text as a new item and keeps the header focused.
    pub fn submit_new_item(&mut self) {
        self.sync_pending_text();
        let before = self.store.items().len();
        self.store.add_item();
        if self.store.items().len() > before {
            self.input.clear();
            if self.store.filter() != Filter::Completed {
                self.select_last();
            }
        }
    }

    /// Leaves the header input. The pending text stays in the store.
    pub fn cancel_adding(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
    }

    /// Switches the selected row into inline editing.
    pub fn start_editing(&mut self) {
        let Some((key, text)) = self
            .selected_item()
            .map(|item| (item.key, item.text.clone()))
        else {
            return;
        };
        self.store.toggle_editing(key, true);
        self.input = TextInput::with_value(text);
        self.mode = AppMode::Editing(key);
        self.status_message = None;
    }

    /// Saves the edited text and leaves editing mode.
    pub fn finish_editing(&mut self) {
        if let AppMode::Editing(key) = self.mode {
            self.store.update_text(key, self.input.value());
            self.store.toggle_editing(key, false);
        }
        self.mode = AppMode::Normal;
        self.input.clear();
    }

    /// Leaves editing mode without touching the item's text.
    pub fn cancel_editing(&mut self) {
        if let AppMode::Editing(key) = self.mode {
            self.store.toggle_editing(key, false);
        }
        self.mode = AppMode::Normal;
        self.input.clear();
    }

    pub fn toggle_selected_complete(&mut self) {
        if let Some((key, complete)) = self.selected_item().map(|item| (item.key, item.complete)) {
            self.store.toggle_complete(key, !complete);
            self.clamp_selection();
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(key) = self.selected_item().map(|item| item.key) {
            self.store.remove_item(key);
            self.clamp_selection();
        }
    }

    pub fn toggle_all_complete(&mut self) {
        self.store.toggle_all_complete();
        self.clamp_selection();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.store.set_filter(filter);
        self.clamp_selection();
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.store.filter().next());
    }

    pub fn clear_completed(&mut self) {
        let before = self.store.items().len();
        self.store.clear_completed();
        self.clamp_selection();
        let removed = before - self.store.items().len();
        self.status_message = Some(format!("Cleared {removed} completed item(s)"));
    }

    /// Writes the current list again, e.g. after a failed save.
    pub fn retry_save(&mut self) {
        self.store.flush();
        self.status_message = Some("Saving...".to_string());
    }

    /// Waits for outstanding writes and stops the storage worker.
    pub fn shutdown(&mut self) {
        let events = self.store.persistence_mut().shutdown();
        for event in events {
            self.handle_storage_event(event);
        }
        if let Some(error) = &self.write_error {
            warn!(%error, "exiting with unsaved changes");
        } else {
            info!(saved = self.last_saved_seq, "all changes saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{ITEMS_KEY, MemoryStore, StorageError};

    fn app_with(payload: Option<&str>) -> (App, MemoryStore) {
        let store = MemoryStore::new();
        let handle = StorageHandle::spawn(store.clone(), ITEMS_KEY).unwrap();
        let mut app = App::new(handle);
        app.handle_storage_event(StorageEvent::Loaded(Ok(payload.map(str::to_string))));
        (app, store)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.input.insert(c);
        }
        app.sync_pending_text();
    }

    const TWO_ITEMS: &str = r#"[{"key":1,"text":"A","complete":false,"editing":false},
                               {"key":2,"text":"B","complete":true,"editing":false}]"#;

    #[test]
    fn test_app_starts_loading() {
        let handle = StorageHandle::spawn(MemoryStore::new(), ITEMS_KEY).unwrap();
        let app = App::new(handle);
        assert!(app.store.is_loading());
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_loaded_event_ends_loading() {
        let (app, _) = app_with(Some(TWO_ITEMS));
        assert!(!app.store.is_loading());
        assert_eq!(app.store.items().len(), 2);
        assert_eq!(app.selected_item().unwrap().text, "A");
    }

    #[test]
    fn test_corrupt_payload_loads_empty() {
        let (app, _) = app_with(Some("not json"));
        assert!(!app.store.is_loading());
        assert!(app.store.items().is_empty());
        assert!(app.selected_item().is_none());
    }

    #[test]
    fn test_read_failure_loads_empty() {
        let handle = StorageHandle::spawn(MemoryStore::new(), ITEMS_KEY).unwrap();
        let mut app = App::new(handle);
        app.handle_storage_event(StorageEvent::Loaded(Err(StorageError::Poisoned)));
        assert!(!app.store.is_loading());
        assert!(app.store.items().is_empty());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_add_through_header() {
        let (mut app, store) = app_with(None);
        app.start_adding();
        type_text(&mut app, "Buy milk");
        app.submit_new_item();

        assert_eq!(app.mode, AppMode::Adding);
        assert!(app.input.value().is_empty());
        assert!(app.store.edit_value().is_empty());
        assert_eq!(app.store.items()[0].text, "Buy milk");

        app.shutdown();
        assert!(store.entry(ITEMS_KEY).unwrap().contains("Buy milk"));
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn test_add_empty_is_ignored() {
        let (mut app, _) = app_with(None);
        app.start_adding();
        app.submit_new_item();
        assert!(app.store.items().is_empty());
    }

    #[test]
    fn test_pending_text_survives_leaving_header() {
        let (mut app, _) = app_with(None);
        app.start_adding();
        type_text(&mut app, "half");
        app.cancel_adding();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.store.edit_value(), "half");
        app.start_adding();
        assert_eq!(app.input.value(), "half");
    }

    #[test]
    fn test_shutdown_while_adding_writes_nothing() {
        let (mut app, store) = app_with(None);
        app.start_adding();
        type_text(&mut app, "unsent");
        app.shutdown();

        assert_eq!(app.store.persistence().last_submitted(), 0);
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.entry(ITEMS_KEY), None);
        assert_eq!(app.store.edit_value(), "unsent");
    }

    #[test]
    fn test_edit_selected_item() {
        let (mut app, _) = app_with(Some(TWO_ITEMS));
        app.start_editing();
        assert_eq!(app.mode, AppMode::Editing(ItemKey(1)));
        assert!(app.store.get(ItemKey(1)).unwrap().editing);

        app.input.insert('!');
        app.finish_editing();

        let item = app.store.get(ItemKey(1)).unwrap();
        assert_eq!(item.text, "A!");
        assert!(!item.editing);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_cancel_edit_keeps_text() {
        let (mut app, _) = app_with(Some(TWO_ITEMS));
        app.start_editing();
        app.input.clear();
        app.cancel_editing();

        let item = app.store.get(ItemKey(1)).unwrap();
        assert_eq!(item.text, "A");
        assert!(!item.editing);
    }

    #[test]
    fn test_toggle_and_remove_selected() {
        let (mut app, _) = app_with(Some(TWO_ITEMS));
        app.toggle_selected_complete();
        assert!(app.store.get(ItemKey(1)).unwrap().complete);

        app.select_next();
        app.remove_selected();
        assert!(app.store.get(ItemKey(2)).is_none());
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_selection_clamped_when_filtered() {
        let (mut app, _) = app_with(Some(TWO_ITEMS));
        app.select_last();
        assert_eq!(app.selected, 1);
        app.set_filter(Filter::Active);
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_item().unwrap().key, ItemKey(1));
    }

    #[test]
    fn test_cycle_filter_and_clear_completed() {
        let (mut app, _) = app_with(Some(TWO_ITEMS));
        app.cycle_filter();
        assert_eq!(app.store.filter(), Filter::Active);
        app.clear_completed();
        assert_eq!(app.store.items().len(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Cleared 1 completed item(s)"));
    }

    #[test]
    fn test_write_failure_is_surfaced_and_retry_clears_it() {
        let (mut app, store) = app_with(Some(TWO_ITEMS));
        store.fail_writes(Some("disk full"));
        app.toggle_all_complete();

        let seq = app.store.persistence().last_submitted();
        app.handle_storage_event(StorageEvent::SaveFailed {
            seq,
            error: StorageError::Simulated("disk full".to_string()),
        });
        assert!(app.write_error.as_deref().unwrap().contains("disk full"));
        assert!(app.has_unsaved_changes());

        store.fail_writes(None);
        app.retry_save();
        let retry_seq = app.store.persistence().last_submitted();
        app.handle_storage_event(StorageEvent::Saved { seq: retry_seq });
        assert!(app.write_error.is_none());
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn test_stale_failure_after_newer_save_is_ignored() {
        let (mut app, _) = app_with(Some(TWO_ITEMS));
        app.toggle_all_complete();
        app.toggle_all_complete();
        app.handle_storage_event(StorageEvent::Saved { seq: 2 });
        app.handle_storage_event(StorageEvent::SaveFailed {
            seq: 1,
            error: StorageError::Simulated("late".to_string()),
        });
        assert!(app.write_error.is_none());
    }
}
