use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Admin {
    pub admin_id: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_role: String, // owner | editor
    pub admin_created_at: String,
    pub admin_last_login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminPayload {
    pub admin_name: String,
    pub admin_email: String,
    pub admin_role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdminPayload {
    pub admin_name: Option<String>,
    pub admin_role: Option<String>,
}
