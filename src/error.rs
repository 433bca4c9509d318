use std::io;

use thiserror::Error;

/// Failures at the note boundary. Every variant names the note it concerns.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note '{0}' does not exist")]
    NotFound(String),
    #[error("a note named '{0}' already exists")]
    Conflict(String),
    #[error("invalid note name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("I/O error on note '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },
}

impl NoteError {
    pub(crate) fn io(id: impl Into<String>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return NoteError::NotFound(id.into());
        }
        NoteError::Io {
            id: id.into(),
            source,
        }
    }

    /// Short text for the status line and dialogs.
    pub fn user_message(&self) -> String {
        match self {
            NoteError::NotFound(id) => format!("ERROR: note '{}' no longer exists", id),
            NoteError::Conflict(_) => "ERROR: a note with this name already exists".to_string(),
            NoteError::InvalidName { reason, .. } => format!("ERROR: {}", reason),
            NoteError::Io { source, .. } => format!("ERROR: {}", source),
        }
    }
}

pub type NoteResult<T> = std::result::Result<T, NoteError>;
