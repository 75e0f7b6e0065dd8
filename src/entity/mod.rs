mod normalize;
mod record;

pub use normalize::{coerce_number, coerce_string, normalize, normalize_items};
pub use record::{
    create_record, generate_id, generate_unique_id, random_color, seed, Record, FALLBACK_COLOR,
    NOTE_EXCERPT_CHARS, PALETTE,
};
