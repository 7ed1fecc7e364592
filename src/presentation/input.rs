use crate::application::{App, AppMode, TextInput};
use crate::domain::Filter;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            app.should_quit = true;
            return;
        }

        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key),
            AppMode::Adding => Self::handle_adding_mode(app, key),
            AppMode::Editing(_) => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('q') => {
                app.should_quit = true;
                return;
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
                return;
            }
            _ => {}
        }

        // Nothing may change the list before the saved one has been read.
        if app.store.is_loading() {
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Home | KeyCode::Char('g') => app.select_first(),
            KeyCode::End | KeyCode::Char('G') => app.select_last(),
            KeyCode::Char('a') | KeyCode::Char('i') => app.start_adding(),
            KeyCode::Char('A') => app.toggle_all_complete(),
            KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected_complete(),
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::F(2) => app.start_editing(),
            KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
            KeyCode::Char('c') => app.clear_completed(),
            KeyCode::Char('f') | KeyCode::Tab => app.cycle_filter(),
            KeyCode::Char('1') => app.set_filter(Filter::All),
            KeyCode::Char('2') => app.set_filter(Filter::Active),
            KeyCode::Char('3') => app.set_filter(Filter::Completed),
            KeyCode::Char('s') => app.retry_save(),
            _ => {}
        }
    }

    fn handle_adding_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.submit_new_item(),
            KeyCode::Esc => app.cancel_adding(),
            _ => {
                if Self::edit_text(&mut app.input, key) {
                    app.sync_pending_text();
                }
            }
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            _ => {
                Self::edit_text(&mut app.input, key);
            }
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    /// Applies a line-editing key to `input`. Returns whether the text changed.
    fn edit_text(input: &mut TextInput, key: KeyCode) -> bool {
        match key {
            KeyCode::Backspace => {
                input.backspace();
                true
            }
            KeyCode::Delete => {
                input.delete();
                true
            }
            KeyCode::Left => {
                input.move_left();
                false
            }
            KeyCode::Right => {
                input.move_right();
                false
            }
            KeyCode::Home => {
                input.move_home();
                false
            }
            KeyCode::End => {
                input.move_end();
                false
            }
            KeyCode::Char(c) => {
                input.insert(c);
                true
            }
            _ => false,
        }
    }
}
