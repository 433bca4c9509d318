// ============================================================================
// UI - key routing and drawing on top of the session
// ============================================================================
//
// 1. App wrapper        - session plus editor widget state
// 2. Event Handling     - one handler per interaction context
// 3. Rendering          - list, preview, editor, status bar, overlays
//
// Nothing here decides what a note is or when it is saved; that lives in the session.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::{COMPACT_HELP_WIDTH, NOTE_EXTENSION};
use crate::order::GroupKind;
use crate::session::{Context, Overlay, Preview, Session};

const BROWSE_COMMANDS: &[(&str, &str)] = &[
    ("↑/↓", "Move through the list"),
    ("Enter", "Open the selected note"),
    ("n", "Create a new note"),
    ("r", "Rename the selected note"),
    ("f", "Mark / unmark as favorite"),
    ("d", "Delete the selected note"),
    ("q", "Quit"),
    ("?", "Show this help"),
];

const EDITOR_COMMANDS: &[(&str, &str)] = &[
    ("Esc", "Save and go back to the list"),
    ("Ctrl+S", "Save now"),
    ("Ctrl+Z/Y", "Undo / redo"),
    ("", "Changes are saved automatically"),
];

pub struct App {
    pub session: Session,
    textarea: TextArea<'static>,
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
    help_scroll: u16,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            textarea: TextArea::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            help_scroll: 0,
        }
    }

    fn start_text_editing(&mut self, content: &str) {
        self.textarea = TextArea::new(content.split('\n').map(|s| s.to_string()).collect());
        self.undo_stack.clear();
        self.redo_stack.clear();
        let line_count = content.split('\n').count().saturating_sub(1);
        let last_len = content.split('\n').last().map(|l| l.chars().count()).unwrap_or(0);
        self.textarea
            .move_cursor(CursorMove::Jump(line_count as u16, last_len as u16));
    }

    fn editor_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn load_snapshot(&mut self, snapshot: &str) {
        let lines: Vec<String> = snapshot.split('\n').map(|s| s.to_string()).collect();
        self.textarea = TextArea::new(lines);
        let end_row = self.textarea.lines().len().saturating_sub(1) as u16;
        let end_col = self
            .textarea
            .lines()
            .last()
            .map(|l| l.chars().count())
            .unwrap_or(0) as u16;
        self.textarea.move_cursor(CursorMove::Jump(end_row, end_col));
    }

    /// Picks up the buffer the session just opened, if any.
    fn sync_editor_from_session(&mut self) {
        let content = self.session.pending().map(|p| p.content().to_string());
        if let Some(content) = content {
            self.start_text_editing(&content);
        }
    }
}

// ============================================================================
// EVENT HANDLING
// ============================================================================

/// Returns true when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match app.session.context() {
        Context::Help => handle_help_key(app, key),
        Context::ConfirmDelete => handle_confirm_key(app, key),
        Context::Rename => handle_rename_key(app, key),
        Context::Editing => handle_editor_key(app, key, now),
        Context::Browsing => return handle_browse_key(app, key),
    }
    false
}

fn handle_browse_key(app: &mut App, key: KeyEvent) -> bool {
    app.session.clear_status();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.session.move_up();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.session.move_down();
        }
        KeyCode::Enter => {
            if app.session.open_selected() {
                app.sync_editor_from_session();
            }
        }
        KeyCode::Char('n') => {
            if app.session.create_note() {
                app.sync_editor_from_session();
            }
        }
        KeyCode::Char('r') => {
            app.session.begin_rename();
        }
        KeyCode::Char('d') => {
            app.session.request_delete();
        }
        KeyCode::Char('f') => {
            app.session.toggle_favorite();
        }
        KeyCode::Char('?') | KeyCode::Char('h') => {
            app.help_scroll = 0;
            app.session.show_help();
        }
        KeyCode::Char('q') => return true,
        _ => {}
    }
    false
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('h') => {
            app.session.close_overlay();
            app.help_scroll = 0;
        }
        KeyCode::Up => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        KeyCode::Down => {
            app.help_scroll = app.help_scroll.saturating_add(1);
        }
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            app.session.cycle_confirm();
        }
        KeyCode::Enter => {
            app.session.activate_confirm();
        }
        KeyCode::Esc => {
            app.session.close_overlay();
        }
        _ => {}
    }
}

fn handle_rename_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.session.close_overlay();
        }
        KeyCode::Enter => {
            app.session.submit_rename();
        }
        KeyCode::Backspace => {
            if let Some(input) = app.session.rename_input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(input) = app.session.rename_input_mut() {
                input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Esc {
        app.session.close_editor();
        app.textarea = TextArea::default();
        app.undo_stack.clear();
        app.redo_stack.clear();
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+S: save without waiting for the quiet period
    if ctrl && key.code == KeyCode::Char('s') {
        app.session.save_now();
        return;
    }

    // Ctrl+Z: Undo
    if ctrl && key.code == KeyCode::Char('z') {
        if let Some(prev) = app.undo_stack.pop() {
            let current = app.editor_text();
            app.redo_stack.push(current);
            app.load_snapshot(&prev);
            app.session.edit(prev, now);
        }
        return;
    }

    // Ctrl+Y: Redo
    if ctrl && key.code == KeyCode::Char('y') {
        if let Some(next) = app.redo_stack.pop() {
            let current = app.editor_text();
            app.undo_stack.push(current);
            app.load_snapshot(&next);
            app.session.edit(next, now);
        }
        return;
    }

    // Forward everything else to the textarea
    let input = Input {
        key: match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Tab => Key::Tab,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Null,
        },
        ctrl,
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };
    let before = app.editor_text();
    app.textarea.input(input);
    let after = app.editor_text();
    if after != before {
        app.undo_stack.push(before);
        app.redo_stack.clear();
        app.session.edit(after, now);
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Get centered popup area for overlays
fn get_popup_area(frame_width: u16, frame_height: u16, width_percent: u16, height_percent: u16) -> Rect {
    let width = frame_width.saturating_mul(width_percent) / 100;
    let height = frame_height.saturating_mul(height_percent) / 100;
    let x = (frame_width.saturating_sub(width)) / 2;
    let y = (frame_height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

pub fn draw(frame: &mut ratatui::Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_header(frame, app, chunks[0]);

    if app.session.is_editing() {
        draw_editor(frame, app, chunks[1]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(chunks[1]);
        draw_note_list(frame, app, body[0]);
        draw_preview(frame, app, body[1]);
    }

    draw_status_bar(frame, app, chunks[2]);

    // Bottom of the stack first so nested popups stay on top.
    let overlays: Vec<Overlay> = app.session.overlays().to_vec();
    for overlay in &overlays {
        match overlay {
            Overlay::Help => draw_help_overlay(frame, app),
            Overlay::ConfirmDelete {
                id,
                confirm_focused,
            } => draw_confirm_popup(frame, id, *confirm_focused),
            Overlay::Rename {
                original,
                input,
                error,
            } => draw_rename_popup(frame, original, input, error.as_deref()),
        }
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = match app.session.pending() {
        Some(pending) => format!("EDITING - {}", pending.id()),
        None => "TERMNOTES".to_string(),
    };
    let header = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
    frame.render_widget(header, area);
}

fn draw_note_list(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let order = app.session.order();
    let selected = app.session.selected();
    let mut items = Vec::new();
    let mut selected_row = None;

    if order.is_empty() {
        items.push(ListItem::new("> NO NOTES YET").style(Style::default().fg(Color::DarkGray)));
        items.push(ListItem::new(""));
        items.push(ListItem::new("Press 'n' to create one").style(Style::default().fg(Color::DarkGray)));
    }

    for (group_idx, group) in order.groups().iter().enumerate() {
        if group_idx > 0 {
            items.push(ListItem::new(""));
        }
        items.push(
            ListItem::new(format!("-- {} --", group.label()))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        );
        let is_favorites = group.kind == GroupKind::Favorites;
        for id in &group.ids {
            let text = if app.session.is_favorite(id) {
                format!(" ★ {}", id)
            } else {
                format!("   {}", id)
            };
            let style = if Some(id.as_str()) == selected {
                selected_row = Some(items.len());
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if is_favorites {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            items.push(ListItem::new(text).style(style));
        }
    }

    let list = List::new(items).block(
        Block::default()
            .title("Notes")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    let mut state = ListState::default();
    state.select(selected_row);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_preview(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let (title, lines) = match app.session.preview() {
        Preview::NoNotes => (
            "Preview".to_string(),
            vec![Line::from("Create a note with 'n' or select an existing one.")],
        ),
        Preview::Note {
            id,
            body,
            truncated,
        } => {
            let mut lines: Vec<Line> = if body.is_empty() {
                vec![Line::from(Span::styled(
                    "[ empty note ]",
                    Style::default().fg(Color::DarkGray),
                ))]
            } else {
                body.lines().map(|l| Line::from(l.to_string())).collect()
            };
            if truncated {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "[...] note truncated, press Enter to see all of it",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )));
            }
            (format!(">> PREVIEW: {} <<", id), lines)
        }
        Preview::Unreadable { id, message } => (
            format!(">> PREVIEW: {} <<", id),
            vec![Line::from(Span::styled(message, Style::default().fg(Color::Red)))],
        ),
    };

    let panel = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Green));
    frame.render_widget(panel, area);
}

fn draw_editor(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = match app.session.pending() {
        Some(p) => format!("{} (Esc: back to list, Ctrl+S: save)", p.id()),
        None => "Content".to_string(),
    };
    render_textarea_editor(frame, app, area, &title);
}

fn textarea_lines_with_cursor(app: &App, height: u16) -> Vec<Line<'static>> {
    let (cursor_row, cursor_col) = app.textarea.cursor();
    let mut lines = Vec::new();
    let text_lines = app.textarea.lines();

    if text_lines.is_empty() {
        lines.push(Line::from("|"));
        return lines;
    }

    for (idx, line) in text_lines.iter().enumerate() {
        if idx == cursor_row {
            let char_col = cursor_col.min(line.chars().count());
            let mut new_line = String::new();
            for (i, c) in line.chars().enumerate() {
                if i == char_col {
                    new_line.push('|');
                }
                new_line.push(c);
            }
            if char_col == line.chars().count() {
                new_line.push('|');
            }
            lines.push(Line::from(Span::styled(
                new_line,
                Style::default().fg(Color::Yellow).bg(Color::Rgb(30, 30, 40)),
            )));
        } else {
            lines.push(Line::from(line.clone()));
        }
    }
    let view_height = height.max(1) as usize;
    if lines.len() > view_height {
        let start = cursor_row.saturating_sub(view_height.saturating_sub(1));
        let end = (start + view_height).min(lines.len());
        lines[start..end].to_vec()
    } else {
        lines
    }
}

fn render_textarea_editor(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str) {
    let inner_height = area.height.saturating_sub(2); // account for borders
    let lines_display = textarea_lines_with_cursor(app, inner_height);
    let panel = Paragraph::new(lines_display)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Green));
    frame.render_widget(panel, area);
}

fn status_text(app: &App, width: u16) -> String {
    let compact = width < COMPACT_HELP_WIDTH;
    match app.session.context() {
        Context::Editing => {
            if compact {
                return "Esc: back".to_string();
            }
            let save_state = match app.session.pending() {
                Some(p) if p.is_scheduled() => "saving soon",
                _ => "autosave on",
            };
            match app.session.stats() {
                Some(stats) => format!(
                    "Esc: back to list | Words: {} | Chars: {} | Reading time: {} | {}",
                    stats.words, stats.chars, stats.reading_time, save_state
                ),
                None => format!("Esc: back to list | {}", save_state),
            }
        }
        Context::Help => "Esc: close help".to_string(),
        Context::ConfirmDelete => "←/→: choose | Enter: apply | Esc: cancel".to_string(),
        Context::Rename => "Enter: apply | Esc: cancel".to_string(),
        Context::Browsing if compact => "?: help".to_string(),
        Context::Browsing => BROWSE_COMMANDS
            .iter()
            .map(|(key, desc)| format!("{}: {}", key, desc.split_whitespace().next().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

fn draw_status_bar(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = match app.session.status() {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(status_text(app, area.width)),
    };
    let bar = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(bar, area);
}

fn command_lines(title: &str, commands: &[(&str, &str)]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))];
    for (key, desc) in commands {
        let key_label = if key.is_empty() {
            String::from("          ")
        } else {
            format!("[ {:<6} ]", key)
        };
        lines.push(Line::from(vec![
            Span::styled(key_label, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::raw(desc.to_string()),
        ]));
    }
    lines
}

fn draw_help_overlay(frame: &mut ratatui::Frame, app: &App) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 70, 70);
    frame.render_widget(Clear, area);

    let mut lines = command_lines("Note list", BROWSE_COMMANDS);
    lines.push(Line::from(""));
    lines.extend(command_lines("Editor", EDITOR_COMMANDS));

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Help - available commands (Esc to close)")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0))
        .style(Style::default().fg(Color::White).bg(Color::Black));
    frame.render_widget(help, area);
}

fn draw_confirm_popup(frame: &mut ratatui::Frame, id: &str, confirm_focused: bool) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 55, 30);

    let block = Block::default()
        .title("[!] Delete note")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Red).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let message = format!(
        "Are you sure you want to delete the note '{}'?\nThis cannot be undone.",
        id
    );
    let para = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(para, chunks[0]);

    let (confirm, cancel) = if confirm_focused {
        ("[ CONFIRM ]", "  CANCEL  ")
    } else {
        ("  CONFIRM  ", "[ CANCEL ]")
    };
    let buttons = Paragraph::new(format!("{}    {}", confirm, cancel))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_widget(buttons, chunks[1]);
}

fn draw_rename_popup(frame: &mut ratatui::Frame, original: &str, input: &str, error: Option<&str>) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 55, 35);

    let block = Block::default()
        .title(format!("Rename note: '{}'", original))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Green).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let hint = Paragraph::new(format!("(without the .{} extension)", NOTE_EXTENSION))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[0]);

    let field = Paragraph::new(format!("> {}|", input))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(field, chunks[1]);

    if let Some(error) = error {
        let err = Paragraph::new(error.to_string())
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));
        frame.render_widget(err, chunks[2]);
    }

    let keys = Paragraph::new("Enter: apply    Esc: cancel")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray).italic());
    frame.render_widget(keys, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::Favorites;
    use crate::store::NoteStore;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(dir: &std::path::Path, notes: &[(&str, &str)]) -> App {
        let notes_dir = dir.join("notes");
        fs::create_dir_all(&notes_dir).unwrap();
        for (id, body) in notes {
            fs::write(notes_dir.join(format!("{id}.txt")), body).unwrap();
        }
        let session = Session::new(
            NoteStore::new(&notes_dir, "txt"),
            Favorites::load(dir.join("favorites.json")),
            Duration::from_millis(500),
            800,
        );
        App::new(session)
    }

    #[test]
    fn typing_in_editor_then_escape_saves_latest_text() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[("a", "hi")]);
        let now = Instant::now();

        handle_key(&mut app, key(KeyCode::Enter), now);
        assert_eq!(app.session.context(), Context::Editing);
        for c in ['!', '?'] {
            handle_key(&mut app, key(KeyCode::Char(c)), now);
        }
        assert_eq!(app.session.pending().unwrap().content(), "hi!?");
        assert!(app.session.pending().unwrap().is_scheduled());

        handle_key(&mut app, key(KeyCode::Esc), now);
        assert_eq!(app.session.context(), Context::Browsing);
        assert_eq!(fs::read_to_string(dir.path().join("notes/a.txt")).unwrap(), "hi!?");
    }

    #[test]
    fn cursor_keys_do_not_schedule_autosave() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[("a", "line")]);
        let now = Instant::now();
        handle_key(&mut app, key(KeyCode::Enter), now);
        handle_key(&mut app, key(KeyCode::Left), now);
        assert!(!app.session.pending().unwrap().is_scheduled());
    }

    #[test]
    fn undo_restores_previous_text() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[("a", "ab")]);
        let now = Instant::now();
        handle_key(&mut app, key(KeyCode::Enter), now);
        handle_key(&mut app, key(KeyCode::Char('c')), now);
        let undo = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        handle_key(&mut app, undo, now);
        assert_eq!(app.session.pending().unwrap().content(), "ab");
        let redo = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        handle_key(&mut app, redo, now);
        assert_eq!(app.session.pending().unwrap().content(), "abc");
    }

    #[test]
    fn rename_dialog_edits_input_and_applies() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[("ab", "")]);
        let now = Instant::now();
        handle_key(&mut app, key(KeyCode::Char('r')), now);
        assert_eq!(app.session.context(), Context::Rename);
        handle_key(&mut app, key(KeyCode::Backspace), now);
        handle_key(&mut app, key(KeyCode::Char('z')), now);
        handle_key(&mut app, key(KeyCode::Enter), now);
        assert_eq!(app.session.context(), Context::Browsing);
        assert_eq!(app.session.selected(), Some("az"));
    }

    #[test]
    fn delete_needs_explicit_confirm_focus() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[("a", "")]);
        let now = Instant::now();
        handle_key(&mut app, key(KeyCode::Char('d')), now);
        handle_key(&mut app, key(KeyCode::Enter), now);
        assert!(dir.path().join("notes/a.txt").exists());

        handle_key(&mut app, key(KeyCode::Char('d')), now);
        handle_key(&mut app, key(KeyCode::Left), now);
        handle_key(&mut app, key(KeyCode::Enter), now);
        assert!(!dir.path().join("notes/a.txt").exists());
        assert_eq!(app.session.selected(), None);
    }

    #[test]
    fn quit_keys() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[]);
        let now = Instant::now();
        assert!(handle_key(&mut app, key(KeyCode::Char('q')), now));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_key(&mut app, ctrl_c, now));
    }

    #[test]
    fn help_letters_do_not_leak_into_browsing() {
        let dir = tempdir().unwrap();
        let mut app = app_with(dir.path(), &[("a", "")]);
        let now = Instant::now();
        handle_key(&mut app, key(KeyCode::Char('?')), now);
        assert!(!handle_key(&mut app, key(KeyCode::Char('q')), now));
        handle_key(&mut app, key(KeyCode::Esc), now);
        assert_eq!(app.session.context(), Context::Browsing);
    }
}
