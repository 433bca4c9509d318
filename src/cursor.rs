use crate::order::VisualOrder;

/// Selection by identity, resolved against the current visual order.
///
/// The last resolved position is remembered so that when the selected note disappears
/// the cursor lands on whatever now occupies that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    selected: Option<String>,
    last_position: usize,
}

impl Cursor {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn position(&self, order: &VisualOrder) -> Option<usize> {
        self.selected.as_deref().and_then(|id| order.position_of(id))
    }

    /// Points at `id` if it is part of `order`; otherwise leaves the cursor alone.
    pub fn select(&mut self, id: &str, order: &VisualOrder) -> bool {
        match order.position_of(id) {
            Some(pos) => {
                self.selected = Some(id.to_string());
                self.last_position = pos;
                true
            }
            None => false,
        }
    }

    /// Re-anchors after a rebuild. Keeps the same note when it still exists, else takes
    /// the note at the old position (clamped to the end), else nothing.
    pub fn reconcile(&mut self, order: &VisualOrder) {
        if let Some(pos) = self.position(order) {
            self.last_position = pos;
            return;
        }
        if order.is_empty() {
            self.selected = None;
            self.last_position = 0;
            return;
        }
        let pos = self.last_position.min(order.len() - 1);
        self.selected = order.id_at(pos).map(str::to_string);
        self.last_position = pos;
    }

    pub fn move_up(&mut self, order: &VisualOrder) -> bool {
        match self.position(order) {
            Some(pos) if pos > 0 => self.jump(order, pos - 1),
            _ => false,
        }
    }

    pub fn move_down(&mut self, order: &VisualOrder) -> bool {
        match self.position(order) {
            Some(pos) if pos + 1 < order.len() => self.jump(order, pos + 1),
            _ => false,
        }
    }

    fn jump(&mut self, order: &VisualOrder, pos: usize) -> bool {
        match order.id_at(pos) {
            Some(id) => {
                self.selected = Some(id.to_string());
                self.last_position = pos;
                true
            }
            None => false,
        }
    }
}
