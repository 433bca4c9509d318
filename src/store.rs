use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{NoteError, NoteResult};

const INVALID_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// One note as seen by a single directory scan. The timestamp comes straight from the
/// filesystem and is only valid for the rebuild that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMeta {
    pub id: String,
    pub modified: DateTime<Local>,
}

/// Directory of `<id>.<ext>` files.
#[derive(Debug, Clone)]
pub struct NoteStore {
    dir: PathBuf,
    extension: String,
}

impl NoteStore {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.to_string(),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, self.extension))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    /// Snapshot of every note, most recently written first, ties broken by id.
    pub fn list(&self) -> NoteResult<Vec<NoteMeta>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| NoteError::Io {
            id: self.dir.display().to_string(),
            source: e,
        })?;

        let mut notes = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!(note = id, error = %e, "skipping note with unreadable metadata");
                    continue;
                }
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            notes.push(NoteMeta {
                id: id.to_string(),
                modified: DateTime::<Local>::from(modified),
            });
        }

        notes.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
        debug!(count = notes.len(), dir = %self.dir.display(), "listed notes");
        Ok(notes)
    }

    pub fn read(&self, id: &str) -> NoteResult<String> {
        fs::read_to_string(self.path_for(id)).map_err(|e| NoteError::io(id, e))
    }

    /// Reads at most `limit` characters. The flag is true when the limit was reached.
    pub fn read_prefix(&self, id: &str, limit: usize) -> NoteResult<(String, bool)> {
        let mut content = String::new();
        fs::File::open(self.path_for(id))
            .and_then(|mut f| f.read_to_string(&mut content))
            .map_err(|e| NoteError::io(id, e))?;
        let total = content.chars().count();
        if total >= limit {
            let cut: String = content.chars().take(limit).collect();
            return Ok((cut, true));
        }
        Ok((content, false))
    }

    /// Replaces the whole file. The content goes to a temp file first and is renamed
    /// into place, so a reader never sees half a note. The temp name does not depend on
    /// the id, so any name `rename` accepts can also be written.
    pub fn write(&self, id: &str, content: &str) -> NoteResult<()> {
        let io_err = |source| NoteError::Io {
            id: id.to_string(),
            source,
        };
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp.write_all(content.as_bytes()).map_err(io_err)?;
        temp.persist(self.path_for(id)).map_err(|e| io_err(e.error))?;
        debug!(note = id, bytes = content.len(), "note written");
        Ok(())
    }

    pub fn create(&self) -> NoteResult<String> {
        self.create_at(Local::now())
    }

    /// New empty note named after `now`. Same-second collisions get `_1`, `_2`, ...
    pub fn create_at(&self, now: DateTime<Local>) -> NoteResult<String> {
        let base = format!("note_{}", now.format("%m%d_%H%M%S"));
        let mut counter = 0u32;
        loop {
            let id = if counter == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, counter)
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_for(&id))
            {
                Ok(_) => {
                    info!(note = %id, "note created");
                    return Ok(id);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(NoteError::Io { id, source: e }),
            }
        }
    }

    pub fn rename(&self, old_id: &str, new_id: &str) -> NoteResult<()> {
        validate_name(new_id)?;
        if old_id == new_id {
            return Ok(());
        }
        if !self.exists(old_id) {
            return Err(NoteError::NotFound(old_id.to_string()));
        }
        if self.exists(new_id) {
            return Err(NoteError::Conflict(new_id.to_string()));
        }
        fs::rename(self.path_for(old_id), self.path_for(new_id))
            .map_err(|e| NoteError::io(old_id, e))?;
        info!(from = old_id, to = new_id, "note renamed");
        Ok(())
    }

    /// Permanent. There is no trash.
    pub fn delete(&self, id: &str) -> NoteResult<()> {
        if !self.exists(id) {
            return Err(NoteError::NotFound(id.to_string()));
        }
        fs::remove_file(self.path_for(id)).map_err(|e| NoteError::io(id, e))?;
        info!(note = id, "note deleted");
        Ok(())
    }
}

pub fn validate_name(name: &str) -> NoteResult<()> {
    let invalid = |reason| NoteError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("the name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("this name is reserved"));
    }
    if name
        .chars()
        .any(|c| INVALID_NAME_CHARS.contains(&c) || c.is_control())
    {
        return Err(invalid("the name contains invalid characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, NoteStore) {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path(), "txt");
        (dir, store)
    }

    #[test]
    fn list_only_picks_up_note_files() {
        let (dir, store) = store();
        fs::write(dir.path().join("alpha.txt"), "a").unwrap();
        fs::write(dir.path().join("beta.md"), "b").unwrap();
        fs::create_dir(dir.path().join("gamma.txt")).unwrap();
        let ids: Vec<String> = store.list().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["alpha".to_string()]);
    }

    #[test]
    fn read_missing_note_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(store.read("nope"), Err(NoteError::NotFound(_))));
    }

    #[test]
    fn write_overwrites_whole_file_and_leaves_no_temp() {
        let (dir, store) = store();
        store.write("n", "first version, long").unwrap();
        store.write("n", "second").unwrap();
        assert_eq!(store.read("n").unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "n.txt")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn long_name_accepted_by_rename_can_still_be_written() {
        let (_dir, store) = store();
        store.write("a", "body").unwrap();
        let long = "x".repeat(248);
        store.rename("a", &long).unwrap();
        store.write(&long, "edited").unwrap();
        assert_eq!(store.read(&long).unwrap(), "edited");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn list_puts_most_recently_written_first() {
        let (dir, store) = store();
        let now = std::time::SystemTime::now();
        for (id, mins_ago) in [("older", 20), ("newer", 10)] {
            let path = dir.path().join(format!("{id}.txt"));
            fs::write(&path, id).unwrap();
            fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(now - std::time::Duration::from_secs(mins_ago * 60))
                .unwrap();
        }
        let ids = |s: &NoteStore| -> Vec<String> {
            s.list().unwrap().into_iter().map(|n| n.id).collect()
        };
        assert_eq!(ids(&store), ["newer", "older"].map(String::from));

        store.write("older", "rewritten").unwrap();
        assert_eq!(ids(&store), ["older", "newer"].map(String::from));
    }

    #[test]
    fn same_second_creation_gets_distinct_ids() {
        let (_dir, store) = store();
        let now = Local.with_ymd_and_hms(2026, 3, 4, 10, 20, 30).unwrap();
        let a = store.create_at(now).unwrap();
        let b = store.create_at(now).unwrap();
        let c = store.create_at(now).unwrap();
        assert_eq!(a, "note_0304_102030");
        assert_eq!(b, "note_0304_102030_1");
        assert_eq!(c, "note_0304_102030_2");
        assert_eq!(store.read(&b).unwrap(), "");
        assert_eq!(store.list().unwrap().len(), 3);
    }

    #[test]
    fn rename_rejects_bad_names() {
        let (_dir, store) = store();
        store.write("a", "").unwrap();
        for bad in ["", "x/y", "what?", "a|b", ".."] {
            assert!(
                matches!(store.rename("a", bad), Err(NoteError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert!(store.exists("a"));
    }

    #[test]
    fn rename_conflict_and_same_name() {
        let (_dir, store) = store();
        store.write("a", "A").unwrap();
        store.write("b", "B").unwrap();
        assert!(matches!(store.rename("a", "b"), Err(NoteError::Conflict(_))));
        store.rename("a", "a").unwrap();
        store.rename("a", "c").unwrap();
        assert!(!store.exists("a"));
        assert_eq!(store.read("c").unwrap(), "A");
    }

    #[test]
    fn rename_missing_source_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(store.rename("ghost", "x"), Err(NoteError::NotFound(_))));
    }

    #[test]
    fn delete_removes_file_once() {
        let (_dir, store) = store();
        store.write("a", "").unwrap();
        store.delete("a").unwrap();
        assert!(!store.exists("a"));
        assert!(matches!(store.delete("a"), Err(NoteError::NotFound(_))));
    }

    #[test]
    fn read_prefix_reports_truncation() {
        let (_dir, store) = store();
        store.write("long", &"é".repeat(10)).unwrap();
        let (text, truncated) = store.read_prefix("long", 4).unwrap();
        assert_eq!(text, "éééé");
        assert!(truncated);
        let (text, truncated) = store.read_prefix("long", 20).unwrap();
        assert_eq!(text.chars().count(), 10);
        assert!(!truncated);
    }
}
