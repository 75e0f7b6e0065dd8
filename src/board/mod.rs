//! In-memory board state: blocks, selection, drag and the edit panel.
//!
//! Nothing here performs I/O. Methods report whether the block list changed so
//! the owner can decide when to persist.

mod transfer;
mod view;

pub use transfer::{decode_import, encode_export, EXPORT_FILE_NAME};
pub use view::{BlockView, Panel};

use crate::entity::{generate_unique_id, Record, FALLBACK_COLOR};

/// Pointer interaction state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { id: String, dx: f64, dy: f64 },
}

/// Field changes coming from the edit form. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub note: Option<String>,
    pub color: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.note.is_none() && self.color.is_none()
    }

    fn apply(self, record: &mut Record) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(note) = self.note {
            record.note = note;
        }
        if let Some(color) = self.color {
            record.color = color;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    records: Vec<Record>,
    selected: Option<String>,
    drag: DragState,
}

impl Board {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            selected: None,
            drag: DragState::Idle,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Select `id`; an unknown id clears the selection.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.get(id).is_some())
            .map(str::to_string);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn select_first(&mut self) {
        let first = self.records.first().map(|r| r.id.clone());
        self.select(first.as_deref());
    }

    /// Append a block and select it. Its id is regenerated if already taken.
    pub fn add(&mut self, mut record: Record) -> String {
        if record.id.is_empty() || self.get(&record.id).is_some() {
            record.id = generate_unique_id(&self.records);
        }
        let id = record.id.clone();
        self.records.push(record);
        self.selected = Some(id.clone());
        id
    }

    /// Apply form edits to the selected block.
    pub fn patch_selected(&mut self, patch: RecordPatch) -> bool {
        let Some(id) = self.selected.clone() else {
            return false;
        };
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                patch.apply(record);
                true
            }
            None => false,
        }
    }

    /// Remove a block. Selection is cleared only if it pointed at that block.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return false;
        };
        self.records.remove(index);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if matches!(&self.drag, DragState::Dragging { id: dragged, .. } if dragged == id) {
            self.drag = DragState::Idle;
        }
        true
    }

    /// Swap in a whole new board and select its first block.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        self.records = records;
        self.drag = DragState::Idle;
        self.select_first();
    }

    /// Start dragging `id`, remembering where on the block it was grabbed.
    pub fn pointer_down(&mut self, id: &str, px: f64, py: f64) -> bool {
        let Some(record) = self.get(id) else {
            return false;
        };
        self.drag = DragState::Dragging {
            id: id.to_string(),
            dx: px - record.x,
            dy: py - record.y,
        };
        true
    }

    /// Move the dragged block under the pointer. Returns whether a block moved.
    pub fn pointer_move(&mut self, px: f64, py: f64) -> bool {
        let DragState::Dragging { id, dx, dy } = &self.drag else {
            return false;
        };
        match self.records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.x = px - dx;
                record.y = py - dy;
                true
            }
            None => false,
        }
    }

    /// Finish a drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = matches!(self.drag, DragState::Dragging { .. });
        self.drag = DragState::Idle;
        was_dragging
    }

    pub fn panel(&self) -> Panel {
        let Some(record) = self.selected.as_deref().and_then(|id| self.get(id)) else {
            return Panel::Hidden;
        };
        let color = if record.color.is_empty() {
            FALLBACK_COLOR.to_string()
        } else {
            record.color.clone()
        };
        Panel::Editing {
            id: record.id.clone(),
            title: record.title.clone(),
            note: record.note.clone(),
            color,
        }
    }

    pub fn view(&self) -> Vec<BlockView> {
        self.records
            .iter()
            .map(|r| BlockView::from_record(r, self.selected.as_deref() == Some(r.id.as_str())))
            .collect()
    }
}
