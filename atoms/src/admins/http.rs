use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::model::{CreateAdminPayload, UpdateAdminPayload};
use super::service::{create_admin, delete_admin, get_admin, list_admins, update_admin};

/// HTTP Handler: POST /admins - create profile after Cognito signup
pub async fn create_admin_handler(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: CreateAdminPayload = serde_json::from_slice(body)?;

    match create_admin(client, table_name, admin_id, payload).await {
        Ok(admin) => Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&admin)?.into())
            .map_err(Box::new)?),
        Err(e) => Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
    }
}

/// HTTP Handler: GET /admins/me
pub async fn get_admin_handler(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match get_admin(client, table_name, admin_id).await {
        Ok(admin) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&admin)?.into())
            .map_err(Box::new)?),
        Err(e) if e == "Admin not found" => Ok(Response::builder()
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

/// HTTP Handler: GET /admins
pub async fn list_admins_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, LambdaError> {
    match list_admins(client, table_name).await {
        Ok(admins) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&admins)?.into())
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to list admins: {}", e);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?)
        }
    }
}

/// HTTP Handler: PATCH /admins/me
pub async fn update_admin_handler(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: UpdateAdminPayload = serde_json::from_slice(body)?;

    match update_admin(client, table_name, admin_id, payload).await {
        Ok(admin) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&admin)?.into())
            .map_err(Box::new)?),
        Err(e) => Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
    }
}

/// HTTP Handler: DELETE /admins/{id}
///
/// The caller must not let an admin delete their own account; the check
/// lives at the routing layer where both ids are in hand.
pub async fn delete_admin_handler(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match delete_admin(client, table_name, admin_id).await {
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
