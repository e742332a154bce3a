use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;

use corium_atoms::admins;

pub const ACCESS_TOKEN_COOKIE: &str = "corium_access";
pub const REFRESH_TOKEN_COOKIE: &str = "corium_refresh";
/// Cognito needs the username to compute SECRET_HASH on refresh, so it is
/// carried in its own cookie alongside the tokens.
pub const USERNAME_COOKIE: &str = "corium_username";

const REFRESH_MAX_AGE: i64 = 30 * 24 * 3600;

const ALLOWED_ORIGINS: &[&str] = &[
    "https://coriumleather.com",
    "https://www.coriumleather.com",
    "https://admin.coriumleather.com",
    "http://localhost:5173",
];

/// Echo the request origin when it is one of ours, else fall back to the
/// storefront. Credentials forbid a wildcard here.
pub fn get_cors_origin(request_origin: Option<&str>) -> String {
    match request_origin {
        Some(origin) if ALLOWED_ORIGINS.contains(&origin) => origin.to_string(),
        _ => "https://coriumleather.com".to_string(),
    }
}

/// Cognito SECRET_HASH: base64(HMAC-SHA256(client_secret, username + client_id))
fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> Result<String, String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(client_secret.as_bytes())
        .map_err(|e| format!("Invalid client secret: {}", e))?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

pub fn build_cookie(name: &str, value: &str, max_age: i64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=None",
        name, value, max_age
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None", name)
}

/// The authenticated admin principal resolved from the request cookies.
/// `set_cookies` carries a rotated access token when the request came in
/// with an expired one and the refresh flow succeeded.
pub struct AuthContext {
    pub admin_id: String,
    pub email: String,
    pub set_cookies: Vec<String>,
}

fn unauthorized() -> Response<Body> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Unauthorized"}).to_string().into())
        .unwrap_or_default()
}

async fn principal_from_token(
    cognito_client: &CognitoClient,
    access_token: &str,
) -> Result<(String, String), String> {
    let user = cognito_client
        .get_user()
        .access_token(access_token)
        .send()
        .await
        .map_err(|e| format!("Cognito get_user error: {}", e))?;

    let mut admin_id = String::new();
    let mut email = String::new();
    for attr in user.user_attributes() {
        match attr.name() {
            "sub" => admin_id = attr.value().unwrap_or_default().to_string(),
            "email" => email = attr.value().unwrap_or_default().to_string(),
            _ => {}
        }
    }

    if admin_id.is_empty() {
        return Err("Cognito user has no sub attribute".to_string());
    }

    Ok((admin_id, email))
}

/// Resolve the admin principal from the request cookies, refreshing the
/// access token transparently when possible. On failure the caller gets a
/// ready-to-send 401.
pub async fn authenticate_cookie_request(
    cognito_client: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    cookie_header: Option<&str>,
) -> Result<AuthContext, Response<Body>> {
    let cookies = parse_cookies(cookie_header.unwrap_or(""));

    if let Some(token) = cookies.get(ACCESS_TOKEN_COOKIE) {
        if let Ok((admin_id, email)) = principal_from_token(cognito_client, token).await {
            return Ok(AuthContext {
                admin_id,
                email,
                set_cookies: vec![],
            });
        }
    }

    // Access token missing or expired - try the refresh token.
    let refresh = match cookies.get(REFRESH_TOKEN_COOKIE) {
        Some(refresh) => refresh,
        None => return Err(unauthorized()),
    };
    let username = match cookies.get(USERNAME_COOKIE) {
        Some(username) => username,
        None => return Err(unauthorized()),
    };
    let hash = match secret_hash(username, client_id, client_secret) {
        Ok(hash) => hash,
        Err(_) => return Err(unauthorized()),
    };

    let result = cognito_client
        .initiate_auth()
        .auth_flow(AuthFlowType::RefreshTokenAuth)
        .client_id(client_id)
        .auth_parameters("REFRESH_TOKEN", refresh)
        .auth_parameters("SECRET_HASH", hash)
        .send()
        .await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Token refresh failed: {}", e);
            return Err(unauthorized());
        }
    };

    let auth_result = match output.authentication_result() {
        Some(auth_result) => auth_result,
        None => return Err(unauthorized()),
    };
    let access_token = match auth_result.access_token() {
        Some(token) => token.to_string(),
        None => return Err(unauthorized()),
    };

    match principal_from_token(cognito_client, &access_token).await {
        Ok((admin_id, email)) => Ok(AuthContext {
            admin_id,
            email,
            set_cookies: vec![build_cookie(
                ACCESS_TOKEN_COOKIE,
                &access_token,
                auth_result.expires_in() as i64,
            )],
        }),
        Err(_) => Err(unauthorized()),
    }
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Handle POST /login
pub async fn login(
    cognito_client: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: LoginRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": format!("Invalid request body: {}", e)})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?)
        }
    };

    let hash = secret_hash(&req.email, client_id, client_secret).map_err(Error::from)?;

    let result = cognito_client
        .initiate_auth()
        .auth_flow(AuthFlowType::UserPasswordAuth)
        .client_id(client_id)
        .auth_parameters("USERNAME", &req.email)
        .auth_parameters("PASSWORD", &req.password)
        .auth_parameters("SECRET_HASH", hash)
        .send()
        .await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Login failed for {}: {}", req.email, e);
            return Ok(Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": "Invalid email or password"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let auth_result = match output.authentication_result() {
        Some(auth_result) => auth_result,
        None => {
            // Unanswered auth challenge; this pool has none configured.
            return Ok(Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": "Invalid email or password"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let access_token = auth_result.access_token().unwrap_or_default().to_string();
    let refresh_token = auth_result.refresh_token().unwrap_or_default().to_string();
    let expires_in = auth_result.expires_in() as i64;

    let (admin_id, email) = principal_from_token(cognito_client, &access_token)
        .await
        .map_err(Error::from)?;

    tracing::info!("Admin {} logged in", email);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header(
            "Set-Cookie",
            build_cookie(ACCESS_TOKEN_COOKIE, &access_token, expires_in),
        )
        .header(
            "Set-Cookie",
            build_cookie(REFRESH_TOKEN_COOKIE, &refresh_token, REFRESH_MAX_AGE),
        )
        .header(
            "Set-Cookie",
            build_cookie(USERNAME_COOKIE, &req.email, REFRESH_MAX_AGE),
        )
        .body(
            serde_json::json!({"admin_id": admin_id, "email": email})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

#[derive(Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

/// Handle POST /signup - creates the Cognito account and the matching
/// admin profile record.
pub async fn signup(
    cognito_client: &CognitoClient,
    dynamo_client: &DynamoClient,
    table_name: &str,
    client_id: &str,
    client_secret: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let req: SignupRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": format!("Invalid request body: {}", e)})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?)
        }
    };

    let hash = secret_hash(&req.email, client_id, client_secret).map_err(Error::from)?;

    let result = cognito_client
        .sign_up()
        .client_id(client_id)
        .secret_hash(hash)
        .username(&req.email)
        .password(&req.password)
        .user_attributes(
            AttributeType::builder()
                .name("email")
                .value(&req.email)
                .build()?,
        )
        .send()
        .await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Signup failed for {}: {}", req.email, e);
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": "Could not create the account"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?);
        }
    };

    let admin_id = output.user_sub().to_string();

    let payload = admins::CreateAdminPayload {
        admin_name: req.name,
        admin_email: req.email.clone(),
        admin_role: "editor".to_string(),
    };
    if let Err(e) = admins::create_admin(dynamo_client, table_name, &admin_id, payload).await {
        // The Cognito account exists; the profile can be recreated later.
        tracing::error!("Failed to create admin profile for {}: {}", req.email, e);
    }

    tracing::info!("Admin account created for {}", req.email);

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"admin_id": admin_id, "email": req.email})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

/// Handle POST /refresh - mint a new access token from the refresh cookie
pub async fn refresh_token(
    cognito_client: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    cookie_header: Option<&str>,
) -> Result<Response<Body>, Error> {
    let cookies = parse_cookies(cookie_header.unwrap_or(""));

    let (refresh, username) = match (
        cookies.get(REFRESH_TOKEN_COOKIE),
        cookies.get(USERNAME_COOKIE),
    ) {
        (Some(refresh), Some(username)) => (refresh, username),
        _ => return Ok(unauthorized()),
    };

    let hash = secret_hash(username, client_id, client_secret).map_err(Error::from)?;

    let result = cognito_client
        .initiate_auth()
        .auth_flow(AuthFlowType::RefreshTokenAuth)
        .client_id(client_id)
        .auth_parameters("REFRESH_TOKEN", refresh)
        .auth_parameters("SECRET_HASH", hash)
        .send()
        .await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Refresh failed: {}", e);
            return Ok(unauthorized());
        }
    };

    let auth_result = match output.authentication_result() {
        Some(auth_result) => auth_result,
        None => return Ok(unauthorized()),
    };
    let access_token = auth_result.access_token().unwrap_or_default();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header(
            "Set-Cookie",
            build_cookie(
                ACCESS_TOKEN_COOKIE,
                access_token,
                auth_result.expires_in() as i64,
            ),
        )
        .body(serde_json::json!({"message": "ok"}).to_string().into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origin_falls_back_for_unknown_origins() {
        assert_eq!(
            get_cors_origin(Some("https://admin.coriumleather.com")),
            "https://admin.coriumleather.com"
        );
        assert_eq!(
            get_cors_origin(Some("https://evil.example")),
            "https://coriumleather.com"
        );
        assert_eq!(get_cors_origin(None), "https://coriumleather.com");
    }

    #[test]
    fn cookie_parsing_handles_spacing() {
        let cookies = parse_cookies("corium_access=abc; corium_username=admin%40corium");
        assert_eq!(cookies.get(ACCESS_TOKEN_COOKIE).unwrap(), "abc");
        assert_eq!(cookies.get(USERNAME_COOKIE).unwrap(), "admin%40corium");
    }

    #[test]
    fn secret_hash_is_deterministic() {
        let a = secret_hash("admin@corium.test", "client", "secret").unwrap();
        let b = secret_hash("admin@corium.test", "client", "secret").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, secret_hash("other@corium.test", "client", "secret").unwrap());
    }
}
