use crate::application::{App, AppMode};
use crate::domain::{Filter, Item};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_items(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if app.store.is_loading() {
        render_loading(f);
    }

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let toggle = if app.store.all_complete() { "[x]" } else { "[ ]" };
    let adding = matches!(app.mode, AppMode::Adding);

    let (text, style) = if adding {
        (app.input.value().to_string(), Style::default().fg(Color::Green))
    } else if app.store.edit_value().is_empty() {
        (
            "What needs to be done?".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.store.edit_value().to_string(), Style::default())
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!("{toggle} "), Style::default().fg(Color::Yellow)),
        Span::styled(text, style),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("ttodo")
            .border_style(border_style(adding)),
    );
    f.render_widget(header, area);

    if adding {
        let x = cursor_column(area.x + 1 + 4, app.input.cursor());
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_items(f: &mut Frame, app: &App, area: Rect) {
    let editing_key = match app.mode {
        AppMode::Editing(key) => Some(key),
        _ => None,
    };

    let rows: Vec<ListItem> = app
        .store
        .visible()
        .iter()
        .map(|item| {
            if editing_key == Some(item.key) {
                ListItem::new(Line::from(vec![
                    Span::raw(checkbox(item)),
                    Span::styled(
                        app.input.value().to_string(),
                        Style::default().fg(Color::Green),
                    ),
                ]))
            } else {
                render_row(item)
            }
        })
        .collect();

    let title = format!("{} ({})", app.store.filter().label(), app.store.visible().len());
    let list = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.store.visible().is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);

    if let Some(key) = editing_key {
        if let Some(row) = app.store.visible().iter().position(|item| item.key == key) {
            let offset = state.offset();
            if row >= offset && (row - offset) < area.height.saturating_sub(2) as usize {
                let x = cursor_column(area.x + 1 + 2 + 4, app.input.cursor());
                let y = area.y + 1 + (row - offset) as u16;
                f.set_cursor_position((x.min(area.right().saturating_sub(2)), y));
            }
        }
    }
}

/// Terminal column of a text cursor `cursor` chars past `start`, saturating
/// instead of wrapping for very long input.
fn cursor_column(start: u16, cursor: usize) -> u16 {
    start.saturating_add(u16::try_from(cursor).unwrap_or(u16::MAX))
}

fn checkbox(item: &Item) -> &'static str {
    if item.complete { "[x] " } else { "[ ] " }
}

fn render_row(item: &Item) -> ListItem<'_> {
    let text_style = if item.complete {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(vec![
        Span::raw(checkbox(item)),
        Span::styled(item.text.as_str(), text_style),
    ]))
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(0)])
        .split(area);

    let count = app.store.count();
    let noun = if count == 1 { "item" } else { "items" };
    let counter = Paragraph::new(format!("{count} {noun} left"))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(counter, chunks[0]);

    let selected = Filter::ALL_FILTERS
        .iter()
        .position(|filter| *filter == app.store.filter())
        .unwrap_or(0);
    let tabs = Tabs::new(Filter::ALL_FILTERS.iter().map(|filter| filter.label()))
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("Filter"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[1]);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(error) = &app.write_error {
        (
            format!("{error} | s: retry"),
            Style::default().fg(Color::Red),
        )
    } else if let Some(status) = &app.status_message {
        (status.clone(), Style::default().fg(Color::Cyan))
    } else {
        let hints = match app.mode {
            AppMode::Normal => {
                "a: add | space: complete | e: edit | d: delete | A: all | f: filter | c: clear completed | ?: help | q: quit"
            }
            AppMode::Adding => "Enter: add item | Esc: leave input",
            AppMode::Editing(_) => "Enter: save | Esc: cancel",
            AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help",
        };
        (hints.to_string(), Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn render_loading(f: &mut Frame) {
    let area = centered(f.area(), 24, 3);
    f.render_widget(Clear, area);
    let loading = Paragraph::new("Loading...")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(loading, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "ttodo Help (Line {}/{})",
                    start_line + 1,
                    help_lines.len()
                ))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"TTODO KEYBOARD REFERENCE

=== ADDING ITEMS ===
a / i           Focus the input line at the top
Enter           Add the typed text as a new item
Esc             Leave the input line (typed text is kept)
                Empty text is never added

=== WORKING WITH ITEMS ===
↑↓ or j/k       Move the selection
Home/End, g/G   Jump to first / last item
Space or x      Mark the selected item complete / active
e, Enter or F2  Edit the selected item's text
                Enter saves, Esc cancels
d or Delete     Remove the selected item
A               Mark every item complete, press again for active

=== FILTERS ===
f or Tab        Cycle All → Active → Completed
1 / 2 / 3       Show All / Active / Completed items
c               Remove every completed item (whatever the filter)

=== SAVING ===
Every change is saved automatically in the background.
If a save fails the status line turns red.
s               Save the current list again

=== OTHER ===
F1 or ?         Show this help
q               Quit (Ctrl+C quits from anywhere)

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#;
