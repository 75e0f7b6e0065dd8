// src/entity/record.rs
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Colors a new block may be painted with.
pub const PALETTE: [&str; 7] = [
    "#60a5fa", "#34d399", "#fbbf24", "#f472b6", "#a78bfa", "#f87171", "#22d3ee",
];

/// Color shown in the edit panel when a block carries none.
pub const FALLBACK_COLOR: &str = "#60a5fa";

/// Maximum number of characters of a note shown on the canvas.
pub const NOTE_EXCERPT_CHARS: usize = 120;

const ID_LEN: usize = 8;

/// One note block on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub note: String,
    pub color: String,
}

impl Record {
    /// Create a block with a freshly generated id. All other fields are taken verbatim.
    pub fn new(
        x: f64,
        y: f64,
        title: impl Into<String>,
        note: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            x,
            y,
            title: title.into(),
            note: note.into(),
            color: color.into(),
        }
    }

    /// Title as rendered on the canvas.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// First [`NOTE_EXCERPT_CHARS`] characters of the note. The stored note is never cut.
    pub fn note_excerpt(&self) -> &str {
        match self.note.char_indices().nth(NOTE_EXCERPT_CHARS) {
            Some((end, _)) => &self.note[..end],
            None => &self.note,
        }
    }
}

pub fn create_record(x: f64, y: f64, title: &str, note: &str, color: &str) -> Record {
    Record::new(x, y, title, note, color)
}

/// Short random id, 8 lowercase hex characters.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Generate an id that no record in `taken` already uses.
pub fn generate_unique_id(taken: &[Record]) -> String {
    loop {
        let id = generate_id();
        if !taken.iter().any(|r| r.id == id) {
            return id;
        }
    }
}

pub fn random_color() -> String {
    PALETTE
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(FALLBACK_COLOR)
        .to_string()
}

/// Default board used on first run and on reset.
pub fn seed() -> Vec<Record> {
    let mut records = Vec::with_capacity(3);
    for (x, y, title, note, color) in [
        (80.0, 80.0, "Idee", "Erste Gedanken…", "#60a5fa"),
        (320.0, 160.0, "Recherche", "Links, Quellen, Zitate", "#34d399"),
        (200.0, 280.0, "To-Dos", "Nächste Schritte als Liste", "#fbbf24"),
    ] {
        let mut record = Record::new(x, y, title, note, color);
        record.id = generate_unique_id(&records);
        records.push(record);
    }
    records
}
