use crate::error::StoreError;
use serde_json::Value;

/// The line that separates a saved report's human-readable text from its data.
pub const JSON_MARKER: &str = "# JSON DATA (for re-loading results)";

/// Extracts the JSON document from the contents of a saved results file.
///
/// Saved files carry a text report, the marker line, a separator and then the
/// JSON. Content without the marker is parsed as a plain JSON document.
pub fn extract_payload(content: &str) -> Result<Value, StoreError> {
    let Some(marker) = content.find(JSON_MARKER) else {
        return Ok(serde_json::from_str(content.trim())?);
    };
    let after_marker = &content[marker + JSON_MARKER.len()..];
    let start = after_marker
        .find(['{', '['])
        .ok_or(StoreError::MissingPayload)?;
    Ok(serde_json::from_str(after_marker[start..].trim())?)
}
