/// Shared field list for both extraction prompts.
const FIELD_OUTLINE: &str = "\
- Patient Name
- Age/DOB
- Date of prescription
- Chief Complaints/Symptoms
- Diagnosis
- Medications (name, dosage, frequency, duration)
- Tests/Lab work ordered
- Doctor's notes/advice";

const JSON_KEYS: &str = "patient_name, age, date, complaints, diagnosis, medications, tests, notes";

/// Prompt for a PDF whose text layer has already been extracted.
pub fn build_text_extraction_prompt(document_text: &str) -> String {
    format!(
        "Extract the following information from this prescription:\n\
         {FIELD_OUTLINE}\n\n\
         Prescription Text:\n\
         <document>\n{document_text}\n</document>\n\n\
         Return ONLY valid JSON with keys: {JSON_KEYS}\n\
         If any field is not found, use null.\n\
         Do not include any markdown formatting or code blocks."
    )
}

/// Prompt sent alongside a prescription image.
pub fn build_image_extraction_prompt() -> String {
    format!(
        "Analyze this prescription image and extract the following information:\n\
         {FIELD_OUTLINE}\n\n\
         Return ONLY valid JSON with keys: {JSON_KEYS}\n\
         If any field is not found, use null.\n\
         Be thorough and extract all visible information."
    )
}
