use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// On-disk shape: a bare JSON array of note ids.
#[derive(Serialize, Deserialize, Default)]
#[serde(transparent)]
struct FavoritesFile(Vec<String>);

/// Persisted set of favorite note ids, kept in insertion order.
///
/// The in-memory list is authoritative for the session: a file that is missing or
/// corrupt loads as empty, and a failed save is logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct Favorites {
    path: PathBuf,
    ids: Vec<String>,
}

impl Favorites {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: Vec::new(),
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut favorites = Self::empty(path);
        favorites.ids = read_ids(&favorites.path);
        favorites
    }

    pub fn save(&self) {
        let data = match serde_json::to_string(&FavoritesFile(self.ids.clone())) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "could not serialize favorites");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let temp_path = self.path.with_extension("json.tmp");
        match fs::write(&temp_path, data).and_then(|_| fs::rename(&temp_path, &self.path)) {
            Ok(()) => debug!(count = self.ids.len(), "favorites saved"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not save favorites"),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|f| f == id)
    }

    /// Stored order; may name notes that no longer exist.
    pub fn all(&self) -> &[String] {
        &self.ids
    }

    /// Symmetric difference with `{id}`. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|f| f == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Moves favorite status from `old_id` to `new_id`, keeping its slot.
    /// Returns false when `old_id` was not a favorite.
    pub fn rekey(&mut self, old_id: &str, new_id: &str) -> bool {
        let Some(pos) = self.ids.iter().position(|f| f == old_id) else {
            return false;
        };
        if old_id == new_id {
            return true;
        }
        self.ids.retain(|f| f != new_id);
        let pos = self.ids.iter().position(|f| f == old_id).unwrap_or(pos);
        self.ids[pos] = new_id.to_string();
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|f| f != id);
        self.ids.len() != before
    }
}

fn read_ids(path: &Path) -> Vec<String> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str::<FavoritesFile>(&data) {
        Ok(FavoritesFile(ids)) => {
            let mut seen = Vec::with_capacity(ids.len());
            for id in ids {
                if !seen.contains(&id) {
                    seen.push(id);
                }
            }
            seen
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "favorites file is corrupt, starting empty");
            Vec::new()
        }
    }
}
