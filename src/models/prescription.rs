use serde::{Deserialize, Serialize};

/// One uploaded document. Rows are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub prescription_id: String,
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub diagnosis: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
}

/// Listing row: the stored record plus upload time and uploading doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionEntry {
    #[serde(flatten)]
    pub record: PrescriptionRecord,
    pub upload_date: String,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub total_prescriptions: i64,
    pub new_patients_week: i64,
}
