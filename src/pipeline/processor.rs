//! Upload processing: extract fields, then update both role summaries.

use std::path::Path;

use serde::Serialize;

use crate::models::Role;
use crate::pipeline::extraction::{DocumentExtractor, ExtractedPrescription, ExtractionError, FileKind};
use crate::pipeline::summary::{SummaryEngine, SummaryError};

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Summary failed: {0}")]
    Summary(#[from] SummaryError),
}

/// Both updated summaries plus the fields they were built from.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutput {
    pub doctor_view: String,
    pub patient_view: String,
    pub extracted_data: ExtractedPrescription,
}

pub struct PrescriptionProcessor {
    extractor: DocumentExtractor,
    summaries: SummaryEngine,
}

impl PrescriptionProcessor {
    pub fn new(extractor: DocumentExtractor, summaries: SummaryEngine) -> Self {
        Self {
            extractor,
            summaries,
        }
    }

    pub fn summaries(&self) -> &SummaryEngine {
        &self.summaries
    }

    /// Run the full pipeline for one uploaded file.
    ///
    /// Both previous summaries are read before either is regenerated.
    pub fn process_prescription(
        &self,
        path: &Path,
        patient_id: &str,
        kind: FileKind,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let mut extracted = self.extractor.extract(path, kind)?;
        extracted.patient_id = Some(patient_id.to_string());

        let previous_doctor = self.summaries.get_existing_summary(patient_id, Role::Doctor);
        let previous_patient = self.summaries.get_existing_summary(patient_id, Role::Patient);

        let doctor_view = self.summaries.generate_summary(
            &extracted,
            previous_doctor.as_deref(),
            patient_id,
            Role::Doctor,
        )?;
        let patient_view = self.summaries.generate_summary(
            &extracted,
            previous_patient.as_deref(),
            patient_id,
            Role::Patient,
        )?;

        Ok(ProcessingOutput {
            doctor_view,
            patient_view,
            extracted_data: extracted,
        })
    }
}
