use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: String,
    pub name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
}

/// Input for `insert_doctor`. The plain-text password is hashed before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub doctor_id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
}
