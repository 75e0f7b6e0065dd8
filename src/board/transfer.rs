use serde_json::Value;

use crate::entity::{normalize, Record};
use crate::error::{NotizError, Result};

/// Suggested name for exported backups.
pub const EXPORT_FILE_NAME: &str = "backup.json";

/// Pretty-printed JSON of the whole board.
pub fn encode_export(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse an imported backup. Only a top-level JSON array is accepted.
pub fn decode_import(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| NotizError::InvalidPayload(format!("file is not valid JSON: {e}")))?;
    normalize(&value)
}
