use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;

use super::parser::parse_extraction_response;
use super::pdf::PdfTextExtractor;
use super::prompt::{build_image_extraction_prompt, build_text_extraction_prompt};
use super::sanitize::sanitize_for_llm;
use super::types::{ExtractedPrescription, FileKind};
use super::ExtractionError;
use crate::pipeline::llm::{InlineImage, LlmClient};

/// Turns an uploaded file into [`ExtractedPrescription`] fields with one
/// model call.
pub struct DocumentExtractor {
    llm: Arc<dyn LlmClient>,
    pdf: PdfTextExtractor,
}

impl DocumentExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            pdf: PdfTextExtractor,
        }
    }

    pub fn extract(&self, path: &Path, kind: FileKind) -> Result<ExtractedPrescription, ExtractionError> {
        let bytes = std::fs::read(path)?;

        let response = match kind {
            FileKind::Pdf => {
                let text = sanitize_for_llm(&self.pdf.extract_text(&bytes)?);
                if text.is_empty() {
                    tracing::warn!(file = %path.display(), "PDF has no text layer");
                }
                self.llm.generate(&build_text_extraction_prompt(&text))?
            }
            FileKind::Image => {
                let image = InlineImage {
                    mime_type: image_mime_type(path),
                    data_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
                };
                self.llm
                    .generate_with_image(&build_image_extraction_prompt(), &image)?
            }
        };

        let extracted = parse_extraction_response(&response);
        tracing::info!(
            file = %path.display(),
            kind = ?kind,
            degraded = extracted.is_degraded(),
            "Prescription fields extracted"
        );
        Ok(extracted)
    }
}

fn image_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "image/jpeg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::pdf::test_pdf::make_test_pdf;
    use crate::pipeline::llm::MockLlmClient;
    use serde_json::json;

    fn extractor(mock: &Arc<MockLlmClient>) -> DocumentExtractor {
        DocumentExtractor::new(mock.clone())
    }

    #[test]
    fn pdf_text_is_sent_as_text_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.pdf");
        std::fs::write(&path, make_test_pdf(&["Diagnosis: flu. Medications: paracetamol 500mg"])).unwrap();

        let mock = Arc::new(MockLlmClient::new(r#"{"diagnosis": "flu", "medications": ["paracetamol 500mg"]}"#));
        let extracted = extractor(&mock).extract(&path, FileKind::Pdf).unwrap();

        assert_eq!(extracted.diagnosis, Some(json!("flu")));
        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("paracetamol"));
        assert!(mock.images().is_empty());
    }

    #[test]
    fn image_is_sent_inline_with_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mock = Arc::new(MockLlmClient::new("```json\n{\"notes\": \"rest\"}\n```"));
        let extracted = extractor(&mock).extract(&path, FileKind::Image).unwrap();

        assert_eq!(extracted.notes, Some(json!("rest")));
        let images = mock.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].mime_type, "image/png");
        assert_eq!(images[0].data_base64, "iVBORw==");
    }

    #[test]
    fn jpeg_extensions_map_to_image_jpeg() {
        assert_eq!(image_mime_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(image_mime_type(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(image_mime_type(Path::new("a.png")), "image/png");
    }

    #[test]
    fn unparseable_reply_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.jpg");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let mock = Arc::new(MockLlmClient::new("Sorry, the image is blurry."));
        let extracted = extractor(&mock).extract(&path, FileKind::Image).unwrap();
        assert!(extracted.is_degraded());
        assert_eq!(extracted.raw_text.as_deref(), Some("Sorry, the image is blurry."));
    }

    #[test]
    fn model_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.jpg");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let mock = Arc::new(MockLlmClient::failing());
        let result = extractor(&mock).extract(&path, FileKind::Image);
        assert!(matches!(result, Err(ExtractionError::Llm(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let mock = Arc::new(MockLlmClient::new("{}"));
        let result = extractor(&mock).extract(Path::new("/nonexistent/rx.pdf"), FileKind::Pdf);
        assert!(matches!(result, Err(ExtractionError::Io(_))));
        assert_eq!(mock.call_count(), 0);
    }
}
