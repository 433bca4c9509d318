//! Derives what the note list shows, top to bottom.
//!
//! The order is a pure function of one store snapshot and the favorites list. It is
//! rebuilt from scratch after every mutation and never patched in place.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::store::NoteMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Favorites,
    Day(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub ids: Vec<String>,
}

impl Group {
    pub fn label(&self) -> String {
        match self.kind {
            GroupKind::Favorites => "FAVORITES".to_string(),
            GroupKind::Day(day) => day.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Favorites block first, then one block per modification day, newest day first.
/// `positions` is the flattened sequence the cursor walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualOrder {
    groups: Vec<Group>,
    positions: Vec<String>,
}

impl VisualOrder {
    pub fn build(notes: &[NoteMeta], favorites: &[String]) -> Self {
        let present: HashSet<&str> = notes.iter().map(|n| n.id.as_str()).collect();

        let mut fav_ids: Vec<String> = Vec::new();
        for id in favorites {
            if present.contains(id.as_str()) && !fav_ids.contains(id) {
                fav_ids.push(id.clone());
            }
        }
        let fav_set: HashSet<&str> = fav_ids.iter().map(|s| s.as_str()).collect();

        let mut by_day: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for note in notes {
            if fav_set.contains(note.id.as_str()) {
                continue;
            }
            by_day
                .entry(note.modified.date_naive())
                .or_default()
                .push(note.id.clone());
        }

        let mut groups = Vec::with_capacity(by_day.len() + 1);
        if !fav_ids.is_empty() {
            groups.push(Group {
                kind: GroupKind::Favorites,
                ids: fav_ids,
            });
        }
        for (day, ids) in by_day.into_iter().rev() {
            groups.push(Group {
                kind: GroupKind::Day(day),
                ids,
            });
        }

        let positions = groups.iter().flat_map(|g| g.ids.iter().cloned()).collect();
        Self { groups, positions }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[cfg(test)]
    pub fn ids(&self) -> &[String] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.positions.iter().position(|p| p == id)
    }

    pub fn id_at(&self, position: usize) -> Option<&str> {
        self.positions.get(position).map(|s| s.as_str())
    }
}
