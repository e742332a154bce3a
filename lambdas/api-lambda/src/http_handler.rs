use corium_atoms as atoms;
use corium_atoms::media::S3ObjectStore;
use corium_shared::{auth, contact};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::env;
use std::sync::Arc;

use lambda_http::http::header::{HeaderValue, SET_COOKIE, VARY};

use corium_shared::AppState;

fn with_set_cookies(mut resp: Response<Body>, cookies: &[String]) -> Response<Body> {
    let headers = resp.headers_mut();
    for cookie in cookies {
        if let Ok(v) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, v);
        }
    }
    resp
}

fn with_cors_headers(mut resp: Response<Body>, request_origin: Option<&str>) -> Response<Body> {
    let cors_origin = auth::get_cors_origin(request_origin);

    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(&cors_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("https://coriumleather.com")),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization,Cookie"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    request_origin: Option<&str>,
    cookies: &[String],
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(with_set_cookies(r, cookies), request_origin))
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

/// Main Lambda handler - routes requests to public, auth, or admin endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    tracing::info!("🚀 API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, request_origin));
    }

    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "corium".to_string());
    let bucket_name = env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "corium-assets".to_string());

    // Route to auth endpoints (no cookie check)
    if path.starts_with("/login") {
        let client_id = env::var("COGNITO_CLIENT_ID").expect("COGNITO_CLIENT_ID must be set");
        let client_secret =
            env::var("COGNITO_CLIENT_SECRET").expect("COGNITO_CLIENT_SECRET must be set");

        return match method {
            &Method::POST => finalize_response(
                auth::login(&state.cognito_client, &client_id, &client_secret, body).await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    if path.starts_with("/signup") {
        let client_id = env::var("COGNITO_CLIENT_ID").expect("COGNITO_CLIENT_ID must be set");
        let client_secret =
            env::var("COGNITO_CLIENT_SECRET").expect("COGNITO_CLIENT_SECRET must be set");

        return match method {
            &Method::POST => finalize_response(
                auth::signup(
                    &state.cognito_client,
                    &state.dynamo_client,
                    &table_name,
                    &client_id,
                    &client_secret,
                    body,
                )
                .await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    if path.starts_with("/refresh") {
        let client_id = env::var("COGNITO_CLIENT_ID").expect("COGNITO_CLIENT_ID must be set");
        let client_secret =
            env::var("COGNITO_CLIENT_SECRET").expect("COGNITO_CLIENT_SECRET must be set");
        let cookie_header = event.headers().get("Cookie").and_then(|v| v.to_str().ok());

        return match method {
            &Method::POST => finalize_response(
                auth::refresh_token(
                    &state.cognito_client,
                    &client_id,
                    &client_secret,
                    cookie_header,
                )
                .await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    if path.starts_with("/logout") {
        return match method {
            &Method::POST => {
                let resp = Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "application/json")
                    .header("Set-Cookie", auth::clear_cookie(auth::ACCESS_TOKEN_COOKIE))
                    .header("Set-Cookie", auth::clear_cookie(auth::REFRESH_TOKEN_COOKIE))
                    .header("Set-Cookie", auth::clear_cookie(auth::USERNAME_COOKIE))
                    .body(serde_json::json!({"message": "ok"}).to_string().into())
                    .map_err(Box::new)?;
                finalize_response(Ok(resp), request_origin, &[])
            }
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    // Contact form route (public - no auth required)
    if path == "/contact" {
        return match method {
            &Method::POST => finalize_response(
                contact::handle_contact(
                    &state.dynamo_client,
                    &state.ses_client,
                    &table_name,
                    body,
                )
                .await,
                request_origin,
                &[],
            ),
            _ => finalize_response(method_not_allowed(), request_origin, &[]),
        };
    }

    // Storefront catalog reads (public)
    if path.starts_with("/products") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, parts.as_slice()) {
            (&Method::GET, ["products"]) => {
                return finalize_response(
                    atoms::products::list_products_handler(&state.dynamo_client, &table_name)
                        .await,
                    request_origin,
                    &[],
                );
            }
            (&Method::GET, ["products", product_id]) => {
                return finalize_response(
                    atoms::products::get_product_handler(
                        &state.dynamo_client,
                        &table_name,
                        product_id,
                    )
                    .await,
                    request_origin,
                    &[],
                );
            }
            _ => {} // mutations fall through to the authenticated section
        }
    }

    // All other routes require auth (cookie auth + auto-refresh)
    let client_id = env::var("COGNITO_CLIENT_ID").expect("COGNITO_CLIENT_ID must be set");
    let client_secret = env::var("COGNITO_CLIENT_SECRET").expect("COGNITO_CLIENT_SECRET must be set");
    let cookie_header = event.headers().get("Cookie").and_then(|v| v.to_str().ok());

    let auth_ctx = match auth::authenticate_cookie_request(
        &state.cognito_client,
        &client_id,
        &client_secret,
        cookie_header,
    )
    .await
    {
        Ok(ctx) => ctx,
        Err(resp) => return Ok(with_cors_headers(resp, request_origin)),
    };

    let admin_id = auth_ctx.admin_id.clone();
    let store = S3ObjectStore::new(state.s3_client.clone(), &bucket_name);

    // Product mutations (admin)
    if path.starts_with("/products") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // POST /products - create product with images
            (&Method::POST, ["products"]) => {
                catalog_block::create_product_handler(
                    &state.dynamo_client,
                    &table_name,
                    &store,
                    &admin_id,
                    body,
                )
                .await
            }
            // PATCH /products/{id} - edit product and its image set
            (&Method::PATCH, ["products", product_id]) => {
                catalog_block::update_product_handler(
                    &state.dynamo_client,
                    &table_name,
                    &store,
                    &admin_id,
                    product_id,
                    body,
                )
                .await
            }
            // DELETE /products/{id} - delete product and its stored images
            (&Method::DELETE, ["products", product_id]) => {
                atoms::products::delete_product_handler(
                    &state.dynamo_client,
                    &table_name,
                    &store,
                    product_id,
                )
                .await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin, &auth_ctx.set_cookies);
    }

    // Contact leads (admin)
    if path.starts_with("/messages") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /messages - list contact leads
            (&Method::GET, ["messages"]) => {
                atoms::messages::list_messages_handler(&state.dynamo_client, &table_name).await
            }
            // PATCH /messages/{id} - mark read/unread
            (&Method::PATCH, ["messages", message_id]) => {
                atoms::messages::update_message_handler(
                    &state.dynamo_client,
                    &table_name,
                    message_id,
                    body,
                )
                .await
            }
            // DELETE /messages/{id}
            (&Method::DELETE, ["messages", message_id]) => {
                atoms::messages::delete_message_handler(
                    &state.dynamo_client,
                    &table_name,
                    message_id,
                )
                .await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin, &auth_ctx.set_cookies);
    }

    // Admin accounts
    if path.starts_with("/admins") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // POST /admins - create own profile after signup
            (&Method::POST, ["admins"]) => {
                atoms::admins::create_admin_handler(
                    &state.dynamo_client,
                    &table_name,
                    &admin_id,
                    body,
                )
                .await
            }
            // GET /admins - list admin accounts
            (&Method::GET, ["admins"]) => {
                atoms::admins::list_admins_handler(&state.dynamo_client, &table_name).await
            }
            // GET /admins/me - own profile
            (&Method::GET, ["admins", "me"]) => {
                atoms::admins::get_admin_handler(&state.dynamo_client, &table_name, &admin_id)
                    .await
            }
            // PATCH /admins/me - update own profile
            (&Method::PATCH, ["admins", "me"]) => {
                atoms::admins::update_admin_handler(
                    &state.dynamo_client,
                    &table_name,
                    &admin_id,
                    body,
                )
                .await
            }
            // DELETE /admins/{id} - remove another admin account
            (&Method::DELETE, ["admins", target_id]) => {
                if *target_id == admin_id {
                    Ok(Response::builder()
                        .status(StatusCode::BAD_REQUEST)
                        .header("Content-Type", "application/json")
                        .body(
                            serde_json::json!({"error": "You cannot delete your own account"})
                                .to_string()
                                .into(),
                        )
                        .map_err(Box::new)?)
                } else {
                    atoms::admins::delete_admin_handler(
                        &state.dynamo_client,
                        &table_name,
                        target_id,
                    )
                    .await
                }
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin, &auth_ctx.set_cookies);
    }

    // No matching route
    tracing::warn!("⚠️ No route matched - Method: {} Path: {}", method, path);
    finalize_response(not_found(), request_origin, &auth_ctx.set_cookies)
}
