use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::service::{delete_product, get_product, list_products};
use crate::media::store::ObjectStore;

/// HTTP Handler: GET /products
pub async fn list_products_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, LambdaError> {
    match list_products(client, table_name).await {
        Ok(products) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&products)?.into())
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to list products: {}", e);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?)
        }
    }
}

/// HTTP Handler: GET /products/{id}
pub async fn get_product_handler(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match get_product(client, table_name, product_id).await {
        Ok(product) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&product)?.into())
            .map_err(Box::new)?),
        Err(e) if e == "Product not found" => Ok(Response::builder()
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

/// HTTP Handler: DELETE /products/{id}
///
/// Removes the record first, then best-effort deletes its stored images -
/// a leftover object never resurrects the product.
pub async fn delete_product_handler(
    client: &DynamoClient,
    table_name: &str,
    store: &dyn ObjectStore,
    product_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match delete_product(client, table_name, product_id).await {
        Ok(product) => {
            for url in &product.images {
                if let Err(e) = store.delete(url).await {
                    tracing::warn!("Failed to delete image {} of product {}: {}", url, product_id, e);
                }
            }
            Ok(Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Body::Empty)
                .map_err(Box::new)?)
        }
        Err(e) if e == "Product not found" => Ok(Response::builder()
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
