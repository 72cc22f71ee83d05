use serde::Serialize;

use super::enums::UserType;

/// A live login session, resolved from the cookie token.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub user_id: String,
    pub user_type: UserType,
    pub user_name: String,
    pub expires_at: String,
}
