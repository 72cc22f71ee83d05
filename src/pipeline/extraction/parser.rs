use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::ExtractedPrescription;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(?:json|JSON)?\s*(.*?)\s*```$").unwrap());

/// Remove a surrounding ```` ```json ```` / ```` ``` ```` fence, if any.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

/// Parse the model's extraction output.
///
/// Never fails: anything that is not a JSON object yields
/// [`ExtractedPrescription::unparsed`]. Unexpected value types and unknown
/// keys are kept as given.
pub fn parse_extraction_response(response: &str) -> ExtractedPrescription {
    let body = strip_code_fence(response);

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => ExtractedPrescription::from_fields(fields),
        Ok(_) => {
            tracing::warn!("Extraction response is JSON but not an object");
            ExtractedPrescription::unparsed(response)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Extraction response is not valid JSON");
            ExtractedPrescription::unparsed(response)
        }
    }
}
