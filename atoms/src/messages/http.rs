use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::model::UpdateMessagePayload;
use super::service::{delete_message, list_messages, set_read};

/// HTTP Handler: GET /messages (admin)
pub async fn list_messages_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, LambdaError> {
    match list_messages(client, table_name).await {
        Ok(messages) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&messages)?.into())
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to list messages: {}", e);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?)
        }
    }
}

/// HTTP Handler: PATCH /messages/{id} (admin)
pub async fn update_message_handler(
    client: &DynamoClient,
    table_name: &str,
    message_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: UpdateMessagePayload = serde_json::from_slice(body)?;
    let read = payload.read.unwrap_or(true);

    match set_read(client, table_name, message_id, read).await {
        Ok(message) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&message)?.into())
            .map_err(Box::new)?),
        Err(e) if e == "Message not found" => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
    }
}

/// HTTP Handler: DELETE /messages/{id} (admin)
pub async fn delete_message_handler(
    client: &DynamoClient,
    table_name: &str,
    message_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match delete_message(client, table_name, message_id).await {
        Ok(_) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
    }
}
