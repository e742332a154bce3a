use aws_sdk_dynamodb::Client as DynamoClient;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lambda_http::{http::StatusCode, Body, Error, Response};
use tokio::sync::mpsc;

use corium_atoms::media::{
    self, CompressOptions, LocalFile, ObjectStore, UploadOutcome, UploadSession,
};
use corium_atoms::products::{self, CreateProductRecord, UpdateProductRecord};

use crate::types::{validate_form, NewImagePayload, SaveProductRequest, SaveProductResponse};

fn bad_request(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": message}).to_string().into())
        .map_err(Box::new)?)
}

fn server_error(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": message}).to_string().into())
        .map_err(Box::new)?)
}

fn decode_files(payloads: &[NewImagePayload]) -> Result<Vec<LocalFile>, String> {
    payloads
        .iter()
        .map(|payload| {
            let data = STANDARD
                .decode(&payload.data_base64)
                .map_err(|e| format!("Invalid file data for {}: {}", payload.file_name, e))?;
            Ok(LocalFile {
                file_name: payload.file_name.clone(),
                content_type: payload.content_type.clone(),
                data,
            })
        })
        .collect()
}

/// Run the selected files through the sequential upload coordinator and
/// fold the event stream back into the session. Returns the batch's base
/// index and the per-file outcomes.
async fn upload_into_session(
    session: &mut UploadSession,
    store: &dyn ObjectStore,
    product_id: Option<&str>,
    files: &[LocalFile],
) -> (usize, Vec<UploadOutcome>) {
    let base = session.append_files(files);
    session.begin_upload(base, files.len());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcomes =
        media::upload_many(store, product_id, files, &CompressOptions::default(), &tx).await;
    drop(tx);
    while let Ok(event) = rx.try_recv() {
        session.apply_event(base, &event);
    }

    (base, outcomes)
}

fn blocked_by_failed_uploads(
    mut session: UploadSession,
    outcomes: Vec<UploadOutcome>,
) -> Result<Response<Body>, Error> {
    session.dispose();
    Ok(Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({
                "error": "Some images failed to upload. Remove them or try again.",
                "upload_results": outcomes,
            })
            .to_string()
            .into(),
        )
        .map_err(Box::new)?)
}

/// HTTP Handler: POST /products (admin)
///
/// Drives a whole add-product save: decode the selected files, upload
/// them sequentially into a fresh session, then commit the session and
/// write the record. New objects land in the temporary namespace since
/// the product id does not exist until the write.
pub async fn create_product_handler(
    client: &DynamoClient,
    table_name: &str,
    store: &dyn ObjectStore,
    admin_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: SaveProductRequest = serde_json::from_slice(body)?;

    tracing::info!(
        "📦 create_product_handler: admin={}, new_images={}",
        admin_id,
        req.new_images.len()
    );

    if let Err(e) = validate_form(&req) {
        return bad_request(&e);
    }
    if req.new_images.is_empty() {
        return bad_request("A product needs at least one image");
    }

    let files = match decode_files(&req.new_images) {
        Ok(files) => files,
        Err(e) => return bad_request(&e),
    };

    let mut session = UploadSession::new();
    let (base, outcomes) = upload_into_session(&mut session, store, None, &files).await;

    if session.has_errored() {
        return blocked_by_failed_uploads(session, outcomes);
    }

    if let Some(index) = req.main_upload_index {
        if let Err(e) = session.set_main(base + index) {
            session.dispose();
            return bad_request(&e);
        }
    }

    let committed = match media::commit(session, store).await {
        Ok(committed) => committed,
        Err(e) => return bad_request(&e),
    };

    let record = CreateProductRecord {
        name: req.name,
        description: req.description,
        category: req.category,
        colors: req.colors,
        price: req.price,
        images: committed.images,
        main_image: committed.main_image,
    };

    match products::create_product(client, table_name, record).await {
        Ok(product) => {
            tracing::info!("✅ Product {} created by {}", product.product_id, admin_id);
            let response = SaveProductResponse {
                product,
                upload_results: outcomes,
            };
            Ok(Response::builder()
                .status(StatusCode::CREATED)
                .header("Content-Type", "application/json")
                .body(serde_json::to_string(&response)?.into())
                .map_err(Box::new)?)
        }
        Err(e) => {
            tracing::error!("❌ create_product failed for admin {}: {}", admin_id, e);
            server_error(&e)
        }
    }
}

/// HTTP Handler: PATCH /products/{id} (admin)
///
/// Replays the edit screen's image changes onto a session seeded from the
/// persisted product: stage removals of preexisting images, upload newly
/// selected files under the product's namespace, reapply the main
/// selection, then commit and update the record in one write.
pub async fn update_product_handler(
    client: &DynamoClient,
    table_name: &str,
    store: &dyn ObjectStore,
    admin_id: &str,
    product_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: SaveProductRequest = serde_json::from_slice(body)?;

    tracing::info!(
        "📦 update_product_handler: admin={}, product={}, removed={}, new_images={}",
        admin_id,
        product_id,
        req.removed_images.len(),
        req.new_images.len()
    );

    if let Err(e) = validate_form(&req) {
        return bad_request(&e);
    }

    let product = match products::get_product(client, table_name, product_id).await {
        Ok(product) => product,
        Err(e) if e == "Product not found" => {
            return Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "application/json")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?)
        }
        Err(e) => return server_error(&e),
    };

    let mut session = UploadSession::from_product(&product.images, &product.main_image);

    for url in &req.removed_images {
        let position = session
            .items()
            .iter()
            .position(|item| item.remote_url.as_deref() == Some(url.as_str()));
        match position {
            Some(index) => {
                if let Err(e) = session.remove_item(index, store).await {
                    session.dispose();
                    return bad_request(&e);
                }
            }
            None => {
                tracing::warn!("⚠️ Removed image {} is not on product {}", url, product_id);
            }
        }
    }

    let files = match decode_files(&req.new_images) {
        Ok(files) => files,
        Err(e) => {
            session.dispose();
            return bad_request(&e);
        }
    };

    let (base, outcomes) =
        upload_into_session(&mut session, store, Some(product_id), &files).await;

    if session.has_errored() {
        return blocked_by_failed_uploads(session, outcomes);
    }

    let explicit_main = if let Some(url) = &req.main_image {
        match session
            .items()
            .iter()
            .position(|item| item.remote_url.as_deref() == Some(url.as_str()))
        {
            Some(index) => Some(index),
            None => {
                session.dispose();
                return bad_request("Main image is not one of the product's images");
            }
        }
    } else {
        req.main_upload_index.map(|index| base + index)
    };

    if let Some(index) = explicit_main {
        if let Err(e) = session.set_main(index) {
            session.dispose();
            return bad_request(&e);
        }
    }

    if !session.has_attached() {
        session.dispose();
        return bad_request("A product needs at least one image");
    }

    let committed = match media::commit(session, store).await {
        Ok(committed) => committed,
        Err(e) => return bad_request(&e),
    };

    let record = UpdateProductRecord {
        name: Some(req.name),
        description: Some(req.description),
        category: Some(req.category),
        colors: Some(req.colors),
        price: req.price,
        images: Some(committed.images),
        main_image: Some(committed.main_image),
    };

    match products::update_product(client, table_name, product_id, record).await {
        Ok(product) => {
            tracing::info!("✅ Product {} updated by {}", product_id, admin_id);
            let response = SaveProductResponse {
                product,
                upload_results: outcomes,
            };
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "application/json")
                .body(serde_json::to_string(&response)?.into())
                .map_err(Box::new)?)
        }
        Err(e) => {
            tracing::error!(
                "❌ update_product failed for {} by {}: {}",
                product_id,
                admin_id,
                e
            );
            server_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_files_reports_the_offending_file() {
        let payloads = vec![NewImagePayload {
            file_name: "satchel.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data_base64: "not base64!".to_string(),
        }];
        let err = decode_files(&payloads).unwrap_err();
        assert!(err.contains("satchel.jpg"));
    }

    #[test]
    fn decode_files_round_trips() {
        let payloads = vec![NewImagePayload {
            file_name: "satchel.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data_base64: STANDARD.encode([1u8, 2, 3]),
        }];
        let files = decode_files(&payloads).unwrap();
        assert_eq!(files[0].data, vec![1, 2, 3]);
    }

    #[test]
    fn failed_uploads_block_the_save() {
        use corium_atoms::media::UploadEvent;

        let mut session = UploadSession::new();
        let base = session.append_files(&[LocalFile {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: vec![1],
        }]);
        session.begin_upload(base, 1);
        session.apply_event(
            base,
            &UploadEvent::Failed {
                index: 0,
                error: "Unsupported file type".to_string(),
            },
        );
        assert!(session.has_errored());

        let outcomes = vec![UploadOutcome::Failed {
            error: "Unsupported file type".to_string(),
        }];
        let resp = blocked_by_failed_uploads(session, outcomes).unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
