// ============================================================================
// SESSION - the whole application state, independent of any terminal
// ============================================================================
//
// Owns the store, the favorites, the derived visual order, the cursor, the mode
// (browsing or editing) and the stack of modal overlays. Every user action from
// the UI lands on one method here; the UI only renders what these accessors return.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::autosave::PendingEdit;
use crate::config::Config;
use crate::cursor::Cursor;
use crate::favorites::Favorites;
use crate::order::VisualOrder;
use crate::store::NoteStore;

#[derive(Debug, Clone)]
pub enum Mode {
    Browsing,
    Editing(PendingEdit),
}

/// Modal popups stacked on top of browsing. Closing one restores whatever was
/// underneath, including another overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
    ConfirmDelete { id: String, confirm_focused: bool },
    Rename {
        original: String,
        input: String,
        error: Option<String>,
    },
}

/// Which handler should receive the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Browsing,
    Editing,
    Help,
    ConfirmDelete,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    NoNotes,
    Note {
        id: String,
        body: String,
        truncated: bool,
    },
    Unreadable {
        id: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub chars: usize,
    pub reading_time: String,
}

impl TextStats {
    pub fn of(content: &str) -> Self {
        let words = content.split_whitespace().count();
        Self {
            words,
            chars: content.trim_end().chars().count(),
            reading_time: reading_time_label(words),
        }
    }
}

/// 200 words per minute.
fn reading_time_label(words: usize) -> String {
    let minutes = words as f64 / 200.0;
    if minutes < 1.0 {
        return format!("{} sec", (minutes * 60.0) as u64);
    }
    let whole = minutes as u64;
    let seconds = ((minutes - whole as f64) * 60.0) as u64;
    if seconds > 0 {
        format!("{} min {} sec", whole, seconds)
    } else {
        format!("{} min", whole)
    }
}

pub struct Session {
    store: NoteStore,
    favorites: Favorites,
    order: VisualOrder,
    cursor: Cursor,
    mode: Mode,
    overlays: Vec<Overlay>,
    status: Option<String>,
    quiet_period: Duration,
    preview_chars: usize,
}

impl Session {
    pub fn open(config: &Config) -> Result<Self> {
        config.ensure_dirs()?;
        let store = NoteStore::new(&config.notes_dir, config.extension);
        let favorites = Favorites::load(&config.favorites_file);
        info!(
            notes_dir = %config.notes_dir.display(),
            favorites = favorites.all().len(),
            "session opened"
        );
        Ok(Self::new(
            store,
            favorites,
            config.quiet_period,
            config.preview_chars,
        ))
    }

    pub fn new(
        store: NoteStore,
        favorites: Favorites,
        quiet_period: Duration,
        preview_chars: usize,
    ) -> Self {
        let mut session = Self {
            store,
            favorites,
            order: VisualOrder::default(),
            cursor: Cursor::default(),
            mode: Mode::Browsing,
            overlays: Vec::new(),
            status: None,
            quiet_period,
            preview_chars,
        };
        session.rebuild();
        session
    }

    // ------------------------------------------------------------------
    // Derived view
    // ------------------------------------------------------------------

    /// Recomputes the visual order from disk and re-anchors the cursor.
    pub fn rebuild(&mut self) {
        match self.store.list() {
            Ok(notes) => {
                self.order = VisualOrder::build(&notes, self.favorites.all());
            }
            Err(e) => {
                warn!(error = %e, "could not list notes");
                self.status = Some(e.user_message());
            }
        }
        self.cursor.reconcile(&self.order);
        debug!(
            visible = self.order.len(),
            selected = ?self.cursor.selected(),
            "visual order rebuilt"
        );
    }

    pub fn order(&self) -> &VisualOrder {
        &self.order
    }

    pub fn selected(&self) -> Option<&str> {
        self.cursor.selected()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        match &self.mode {
            Mode::Editing(pending) => Some(pending),
            Mode::Browsing => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn preview(&self) -> Preview {
        let Some(id) = self.selected() else {
            return Preview::NoNotes;
        };
        match self.store.read_prefix(id, self.preview_chars) {
            Ok((body, truncated)) => Preview::Note {
                id: id.to_string(),
                body,
                truncated,
            },
            Err(e) => Preview::Unreadable {
                id: id.to_string(),
                message: e.user_message(),
            },
        }
    }

    pub fn stats(&self) -> Option<TextStats> {
        self.pending().map(|p| TextStats::of(p.content()))
    }

    // ------------------------------------------------------------------
    // Interaction contexts
    // ------------------------------------------------------------------

    pub fn context(&self) -> Context {
        match self.overlays.last() {
            Some(Overlay::Help) => Context::Help,
            Some(Overlay::ConfirmDelete { .. }) => Context::ConfirmDelete,
            Some(Overlay::Rename { .. }) => Context::Rename,
            None if self.is_editing() => Context::Editing,
            None => Context::Browsing,
        }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    fn push_overlay(&mut self, overlay: Overlay) -> bool {
        if self.is_editing() {
            return false;
        }
        debug!(?overlay, depth = self.overlays.len() + 1, "overlay opened");
        self.overlays.push(overlay);
        true
    }

    pub fn close_overlay(&mut self) -> Option<Overlay> {
        let closed = self.overlays.pop();
        if closed.is_some() {
            debug!(depth = self.overlays.len(), "overlay closed");
        }
        closed
    }

    pub fn show_help(&mut self) -> bool {
        self.push_overlay(Overlay::Help)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn move_up(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.cursor.move_up(&self.order)
    }

    pub fn move_down(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.cursor.move_down(&self.order)
    }

    // ------------------------------------------------------------------
    // Mode transitions and autosave
    // ------------------------------------------------------------------

    /// Browsing -> editing on the selected note. A note that cannot be read is never
    /// opened, so its error text can't be autosaved over it.
    pub fn open_selected(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        let Some(id) = self.cursor.selected().map(str::to_string) else {
            return false;
        };
        match self.store.read(&id) {
            Ok(content) => {
                info!(note = %id, "editing note");
                self.mode = Mode::Editing(PendingEdit::new(id, content, self.quiet_period));
                self.status = None;
                true
            }
            Err(e) => {
                warn!(note = %id, error = %e, "could not open note");
                self.status = Some(e.user_message());
                self.rebuild();
                false
            }
        }
    }

    pub fn edit(&mut self, content: impl Into<String>, now: Instant) {
        if let Mode::Editing(pending) = &mut self.mode {
            pending.on_edit(content, now);
        }
    }

    /// Runs the autosave timer. Returns true when a flush was written.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &mut self.mode {
            Mode::Editing(pending) => pending.poll(now, &self.store),
            Mode::Browsing => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending().and_then(|p| p.deadline())
    }

    /// Explicit save from the editor.
    pub fn save_now(&mut self) -> bool {
        let Mode::Editing(pending) = &mut self.mode else {
            return false;
        };
        let saved = pending.flush_now(&self.store);
        self.status = if saved {
            None
        } else {
            Some("ERROR: the note could not be saved".to_string())
        };
        saved
    }

    /// Editing -> browsing. The buffer is always flushed first, and a failed write
    /// does not stop the transition.
    pub fn close_editor(&mut self) -> bool {
        let Mode::Editing(mut pending) = std::mem::replace(&mut self.mode, Mode::Browsing) else {
            return false;
        };
        pending.flush_now(&self.store);
        info!(note = %pending.id(), "left editor");
        self.rebuild();
        self.cursor.select(pending.id(), &self.order);
        true
    }

    // ------------------------------------------------------------------
    // Collection mutations
    // ------------------------------------------------------------------

    /// Creates an empty note, selects it and opens it in the editor.
    pub fn create_note(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        match self.store.create() {
            Ok(id) => {
                self.rebuild();
                self.cursor.select(&id, &self.order);
                self.open_selected()
            }
            Err(e) => {
                warn!(error = %e, "could not create note");
                self.status = Some(e.user_message());
                false
            }
        }
    }

    pub fn toggle_favorite(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        let Some(id) = self.cursor.selected().map(str::to_string) else {
            return false;
        };
        let now_favorite = self.favorites.toggle(&id);
        info!(note = %id, favorite = now_favorite, "favorite toggled");
        self.favorites.save();
        self.rebuild();
        true
    }

    pub fn request_delete(&mut self) -> bool {
        let Some(id) = self.cursor.selected().map(str::to_string) else {
            return false;
        };
        self.push_overlay(Overlay::ConfirmDelete {
            id,
            confirm_focused: false,
        })
    }

    /// Moves focus between the two confirm buttons.
    pub fn cycle_confirm(&mut self) {
        if let Some(Overlay::ConfirmDelete {
            confirm_focused, ..
        }) = self.overlays.last_mut()
        {
            *confirm_focused = !*confirm_focused;
        }
    }

    /// Enter on the confirm dialog: deletes only when CONFIRM has focus.
    pub fn activate_confirm(&mut self) -> bool {
        let Some(Overlay::ConfirmDelete {
            confirm_focused, ..
        }) = self.overlays.last()
        else {
            return false;
        };
        let confirmed = *confirm_focused;
        let Some(Overlay::ConfirmDelete { id, .. }) = self.close_overlay() else {
            return false;
        };
        if confirmed { self.delete_note(&id) } else { false }
    }

    fn delete_note(&mut self, id: &str) -> bool {
        let deleted = match self.store.delete(id) {
            Ok(()) => {
                if self.favorites.remove(id) {
                    self.favorites.save();
                }
                true
            }
            Err(e) => {
                warn!(note = id, error = %e, "could not delete note");
                self.status = Some(e.user_message());
                false
            }
        };
        self.rebuild();
        deleted
    }

    pub fn begin_rename(&mut self) -> bool {
        let Some(id) = self.cursor.selected().map(str::to_string) else {
            return false;
        };
        self.push_overlay(Overlay::Rename {
            input: id.clone(),
            original: id,
            error: None,
        })
    }

    pub fn rename_input_mut(&mut self) -> Option<&mut String> {
        match self.overlays.last_mut() {
            Some(Overlay::Rename { input, .. }) => Some(input),
            _ => None,
        }
    }

    /// Applies the rename dialog. On failure the dialog stays open with the reason.
    pub fn submit_rename(&mut self) -> bool {
        let Some(Overlay::Rename {
            original, input, ..
        }) = self.overlays.last()
        else {
            return false;
        };
        let original = original.clone();
        let new_id = input.trim().to_string();

        if new_id == original {
            self.close_overlay();
            return true;
        }

        if let Err(e) = self.store.rename(&original, &new_id) {
            debug!(from = %original, to = %new_id, error = %e, "rename rejected");
            if let Some(Overlay::Rename { error, .. }) = self.overlays.last_mut() {
                *error = Some(e.user_message());
            }
            return false;
        }

        // A stale entry under the new name must not turn the note into a favorite.
        if self.favorites.rekey(&original, &new_id) || self.favorites.remove(&new_id) {
            self.favorites.save();
        }
        self.close_overlay();
        self.rebuild();
        self.cursor.select(&new_id, &self.order);
        true
    }

    /// Flushes an open editor and persists favorites before the process exits.
    pub fn shutdown(&mut self) {
        if let Mode::Editing(pending) = &mut self.mode {
            pending.flush_now(&self.store);
        }
        self.favorites.save();
        info!("session closed");
    }
}
