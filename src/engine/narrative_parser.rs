use crate::model::narrative::NarrativeReply;

/// Decode the raw model output into a typed reply.
pub fn parse_narrative(raw: &str) -> Result<NarrativeReply, String> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err("The narrator returned an empty reply".to_string());
    }

    serde_json::from_str::<NarrativeReply>(cleaned)
        .map_err(|e| format!("The narrator's reply could not be read as JSON: {e}"))
}

/// Models sometimes wrap the JSON in ```json ... ``` despite being asked
/// for a bare object.
fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag, if any, up to the first newline.
        text = match rest.split_once('\n') {
            Some((tag, body)) if !tag.trim_start().starts_with('{') => body,
            _ => rest.trim_start_matches("json"),
        };
        text = text.trim_end();
        text = text.strip_suffix("```").unwrap_or(text);
    }

    text.trim()
}
