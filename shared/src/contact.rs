use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_sesv2::Client as SesClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};

use corium_atoms::messages;

use crate::email::send_contact_email;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
struct ContactResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

fn bad_request(error: &str, message: &str) -> Result<Response<Body>, Error> {
    let body = ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
    };
    Ok(Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&body)?.into())
        .map_err(Box::new)?)
}

/// Handle contact form submission: persist the lead, then notify the shop
/// inbox. The record is the canonical copy - a mail failure is logged and
/// the submission still succeeds.
pub async fn handle_contact(
    dynamo_client: &DynamoClient,
    ses_client: &SesClient,
    table_name: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let body_str = match body {
        Body::Text(text) => text,
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    };

    tracing::info!("Contact form submission received");

    let contact_request: ContactRequest = match serde_json::from_str(body_str) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("Failed to parse contact request: {}", e);
            return bad_request("InvalidRequest", &format!("Invalid request body: {}", e));
        }
    };

    // Basic validation
    if contact_request.name.trim().is_empty() {
        return bad_request("InvalidName", "Please provide your name");
    }

    if contact_request.email.is_empty() || !contact_request.email.contains('@') {
        return bad_request("InvalidEmail", "Please provide a valid email address");
    }

    if contact_request.message.trim().is_empty() {
        return bad_request("InvalidMessage", "Please provide a message");
    }

    let payload = messages::CreateMessagePayload {
        name: contact_request.name.clone(),
        email: contact_request.email.clone(),
        phone: contact_request.phone.clone(),
        body: contact_request.message.clone(),
    };

    let stored = match messages::create_message(dynamo_client, table_name, payload).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!("Failed to store contact message: {}", e);
            let error = ErrorResponse {
                error: "StorageFailed".to_string(),
                message: "Failed to send message. Please try again later.".to_string(),
            };
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(serde_json::to_string(&error)?.into())
                .map_err(Box::new)?);
        }
    };

    if let Err(e) = send_contact_email(
        ses_client,
        &contact_request.name,
        &contact_request.email,
        contact_request.phone.as_deref(),
        &contact_request.message,
    )
    .await
    {
        // Lead is already saved; the inbox notification is best-effort.
        tracing::warn!("Failed to send contact email for {}: {}", stored.message_id, e);
    } else {
        tracing::info!("Contact email sent for message {}", stored.message_id);
    }

    let response = ContactResponse {
        message: "Message sent successfully".to_string(),
    };
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(&response)?.into())
        .map_err(Box::new)?)
}
