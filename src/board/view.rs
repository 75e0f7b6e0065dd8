use serde::Serialize;

use crate::entity::Record;

/// A block as it appears on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub excerpt: String,
    pub color: String,
    pub selected: bool,
}

impl BlockView {
    pub fn from_record(record: &Record, selected: bool) -> Self {
        Self {
            id: record.id.clone(),
            x: record.x,
            y: record.y,
            title: record.display_title().to_string(),
            excerpt: record.note_excerpt().to_string(),
            color: record.color.clone(),
            selected,
        }
    }
}

/// Edit panel next to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Hidden,
    Editing {
        id: String,
        title: String,
        note: String,
        color: String,
    },
}

impl Panel {
    pub fn is_visible(&self) -> bool {
        matches!(self, Panel::Editing { .. })
    }
}
