use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with an embedded text layer; scanned pages yield
/// empty text.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Text of each page, in order.
    pub fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }

    /// All pages concatenated.
    pub fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.extract_pages(pdf_bytes)?.concat())
    }
}

#[cfg(test)]
pub(crate) mod test_pdf {
    /// Build a PDF with one page per entry in `pages`, using lopdf (the
    /// library pdf-extract reads with).
    pub fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::test_pdf::make_test_pdf;
    use super::*;

    #[test]
    fn extracts_text_from_digital_pdf() {
        let pdf = make_test_pdf(&["Diagnosis: flu. Medications: paracetamol 500mg"]);
        let text = PdfTextExtractor.extract_text(&pdf).unwrap();
        assert!(text.contains("Diagnosis"), "got: {text}");
        assert!(text.contains("paracetamol"), "got: {text}");
    }

    #[test]
    fn pages_are_concatenated_in_order() {
        let pdf = make_test_pdf(&["First page", "Second page"]);
        let pages = PdfTextExtractor.extract_pages(&pdf).unwrap();
        assert_eq!(pages.len(), 2);

        let text = PdfTextExtractor.extract_text(&pdf).unwrap();
        let first = text.find("First").unwrap();
        let second = text.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let result = PdfTextExtractor.extract_text(b"not a pdf");
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }
}
