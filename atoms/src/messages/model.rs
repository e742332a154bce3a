use serde::{Deserialize, Serialize};

/// Contact-lead record captured from the public contact form
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactMessage {
    pub message_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessagePayload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessagePayload {
    pub read: Option<bool>,
}
