use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ExtractionError;
use crate::pipeline::storage::flatten_value;

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// How an uploaded document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    /// Case-insensitive; `None` for anything outside [`ALLOWED_EXTENSIONS`].
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            _ => None,
        }
    }

    /// Derive the kind and the lowercase extension from a file name.
    pub fn from_filename(name: &str) -> Result<(Self, String), ExtractionError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ExtractionError::UnsupportedFileType(name.to_string()))?;
        let kind = Self::from_extension(&ext)
            .ok_or_else(|| ExtractionError::UnsupportedFileType(ext.clone()))?;
        Ok((kind, ext))
    }
}

pub const PARSE_FAILURE_MESSAGE: &str = "Could not parse structured data";

/// Structured fields pulled from one prescription.
///
/// The eight fixed keys always serialize (as `null` when absent) and may
/// hold any JSON the model produced. `raw_text` and `error` only appear when
/// the model output could not be parsed. Any other keys the model returned
/// are carried in `extra` and serialize alongside the fixed ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPrescription {
    #[serde(default)]
    pub patient_name: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub complaints: Option<Value>,
    #[serde(default)]
    pub diagnosis: Option<Value>,
    #[serde(default)]
    pub medications: Option<Value>,
    #[serde(default)]
    pub tests: Option<Value>,
    #[serde(default)]
    pub notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// Keys the pipeline sets itself; model-supplied values are discarded.
const PIPELINE_KEYS: [&str; 3] = ["patient_id", "raw_text", "error"];

impl ExtractedPrescription {
    /// Degraded result: the model text is kept whole and also used as notes.
    pub fn unparsed(raw: &str) -> Self {
        Self {
            notes: Some(Value::String(raw.to_string())),
            raw_text: Some(raw.to_string()),
            error: Some(PARSE_FAILURE_MESSAGE.to_string()),
            ..Default::default()
        }
    }

    /// Build from a parsed JSON object. Fixed keys may hold any JSON; a
    /// `null` reads as absent.
    pub fn from_fields(mut fields: Map<String, Value>) -> Self {
        for key in PIPELINE_KEYS {
            fields.remove(key);
        }
        let mut take = |key: &str| fields.remove(key).filter(|v| !v.is_null());
        let patient_name = take("patient_name");
        let age = take("age");
        let date = take("date");
        let complaints = take("complaints");
        let diagnosis = take("diagnosis");
        let medications = take("medications");
        let tests = take("tests");
        let notes = take("notes");

        Self {
            patient_name,
            age,
            date,
            complaints,
            diagnosis,
            medications,
            tests,
            notes,
            extra: fields,
            ..Default::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn diagnosis_text(&self) -> Option<String> {
        field_text(&self.diagnosis)
    }

    pub fn medications_text(&self) -> Option<String> {
        field_text(&self.medications)
    }

    pub fn notes_text(&self) -> Option<String> {
        field_text(&self.notes)
    }
}

fn field_text(field: &Option<Value>) -> Option<String> {
    field
        .as_ref()
        .filter(|v| !v.is_null())
        .map(flatten_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extension_mapping() {
        assert_eq!(FileKind::from_extension("PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension("jpeg"), Some(FileKind::Image));
        assert_eq!(FileKind::from_extension("Png"), Some(FileKind::Image));
        assert_eq!(FileKind::from_extension("txt"), None);
        assert_eq!(FileKind::from_extension("gif"), None);
    }

    #[test]
    fn filename_without_extension_is_rejected() {
        assert!(FileKind::from_filename("prescription").is_err());
        assert!(FileKind::from_filename("notes.txt").is_err());
        let (kind, ext) = FileKind::from_filename("scan.JPG").unwrap();
        assert_eq!(kind, FileKind::Image);
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn fixed_keys_always_serialize() {
        let value = ExtractedPrescription::default().to_json();
        let obj = value.as_object().unwrap();
        for key in ["patient_name", "age", "date", "complaints", "diagnosis", "medications", "tests", "notes"] {
            assert!(obj.contains_key(key), "missing {key}");
            assert!(obj[key].is_null());
        }
        assert!(!obj.contains_key("raw_text"));
        assert!(!obj.contains_key("error"));
        assert!(!obj.contains_key("patient_id"));
    }

    #[test]
    fn extra_keys_serialize_next_to_fixed_ones() {
        let mut fields = Map::new();
        fields.insert("diagnosis".into(), json!("flu"));
        fields.insert("follow_up".into(), json!("2 weeks"));
        fields.insert("error".into(), json!("model says hi"));
        fields.insert("notes".into(), Value::Null);

        let extracted = ExtractedPrescription::from_fields(fields);
        assert!(!extracted.is_degraded());
        assert_eq!(extracted.notes, None);

        let json = extracted.to_json();
        assert_eq!(json["diagnosis"], "flu");
        assert_eq!(json["follow_up"], "2 weeks");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn unparsed_keeps_raw_text_as_notes() {
        let degraded = ExtractedPrescription::unparsed("garbled output");
        assert!(degraded.is_degraded());
        let json = degraded.to_json();
        assert_eq!(json["raw_text"], "garbled output");
        assert_eq!(json["notes"], "garbled output");
        assert_eq!(json["error"], PARSE_FAILURE_MESSAGE);
    }

    #[test]
    fn field_text_flattens_lists() {
        let extracted = ExtractedPrescription {
            diagnosis: Some(json!("flu")),
            medications: Some(json!(["paracetamol 500mg"])),
            ..Default::default()
        };
        assert_eq!(extracted.diagnosis_text().as_deref(), Some("flu"));
        assert_eq!(extracted.medications_text().as_deref(), Some(r#"["paracetamol 500mg"]"#));
        assert_eq!(extracted.notes_text(), None);
    }
}
