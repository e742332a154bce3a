use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{Admin, CreateAdminPayload, UpdateAdminPayload};

fn parse_admin(admin_id: &str, item: &HashMap<String, AttributeValue>) -> Admin {
    let mut admin_name = item.get("admin_name").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default();
    let admin_email = item.get("admin_email").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default();
    if admin_name.trim().is_empty() {
        admin_name = admin_email.split('@').next().unwrap_or("Admin").to_string();
    }

    Admin {
        admin_id: admin_id.to_string(),
        admin_name,
        admin_email,
        admin_role: item.get("admin_role").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        admin_created_at: item.get("admin_created_at").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        admin_last_login: item.get("admin_last_login").and_then(|v| v.as_s().ok()).map(|s| s.to_string()),
    }
}

/// Create the admin profile in DynamoDB after the Cognito signup.
/// This is called once per account.
pub async fn create_admin(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
    payload: CreateAdminPayload,
) -> Result<Admin, String> {
    let now = chrono::Utc::now().to_rfc3339();
    let pk = format!("ADMIN#{}", admin_id);

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(pk.clone()))
        .item("SK", AttributeValue::S(pk))
        .item("admin_name", AttributeValue::S(payload.admin_name.clone()))
        .item("admin_email", AttributeValue::S(payload.admin_email.clone()))
        .item("admin_role", AttributeValue::S(payload.admin_role.clone()))
        .item("admin_created_at", AttributeValue::S(now.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(Admin {
        admin_id: admin_id.to_string(),
        admin_name: payload.admin_name,
        admin_email: payload.admin_email,
        admin_role: payload.admin_role,
        admin_created_at: now,
        admin_last_login: None,
    })
}

/// Get an admin profile, refreshing last_login on every read
pub async fn get_admin(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
) -> Result<Admin, String> {
    let pk = format!("ADMIN#{}", admin_id);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(pk.clone()))
        .key("SK", AttributeValue::S(pk.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    let item = match result.item() {
        Some(item) => item,
        None => return Err("Admin not found".to_string()),
    };

    let mut admin = parse_admin(admin_id, item);

    let now = chrono::Utc::now().to_rfc3339();
    let _ = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(pk.clone()))
        .key("SK", AttributeValue::S(pk))
        .update_expression("SET admin_last_login = :login")
        .expression_attribute_values(":login", AttributeValue::S(now.clone()))
        .send()
        .await;
    admin.admin_last_login = Some(now);

    Ok(admin)
}

/// List every admin account
pub async fn list_admins(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<Admin>, String> {
    let result = client
        .scan()
        .table_name(table_name)
        .filter_expression("begins_with(PK, :prefix) AND PK = SK")
        .expression_attribute_values(":prefix", AttributeValue::S("ADMIN#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB scan error: {}", e))?;

    let mut admins = Vec::new();
    for item in result.items() {
        if let Some(pk) = item.get("PK").and_then(|v| v.as_s().ok()) {
            if let Some(admin_id) = pk.strip_prefix("ADMIN#") {
                admins.push(parse_admin(admin_id, item));
            }
        }
    }

    admins.sort_by(|a, b| a.admin_created_at.cmp(&b.admin_created_at));

    Ok(admins)
}

/// Update an admin profile
pub async fn update_admin(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
    payload: UpdateAdminPayload,
) -> Result<Admin, String> {
    let pk = format!("ADMIN#{}", admin_id);

    let mut update_expr = vec![];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    if let Some(name) = payload.admin_name {
        update_expr.push("#admin_name = :admin_name");
        expr_names.insert("#admin_name".to_string(), "admin_name".to_string());
        expr_values.insert(":admin_name".to_string(), AttributeValue::S(name));
    }

    if let Some(role) = payload.admin_role {
        update_expr.push("admin_role = :admin_role");
        expr_values.insert(":admin_role".to_string(), AttributeValue::S(role));
    }

    if !update_expr.is_empty() {
        let mut builder = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .update_expression(format!("SET {}", update_expr.join(", ")));

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k, v);
        }

        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k, v);
        }

        builder
            .send()
            .await
            .map_err(|e| format!("DynamoDB update_item error: {}", e))?;
    }

    // Return the updated profile without touching last_login
    let pk = format!("ADMIN#{}", admin_id);
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(pk.clone()))
        .key("SK", AttributeValue::S(pk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Ok(parse_admin(admin_id, item)),
        None => Err("Admin not found".to_string()),
    }
}

/// Delete an admin profile
pub async fn delete_admin(
    client: &DynamoClient,
    table_name: &str,
    admin_id: &str,
) -> Result<(), String> {
    let pk = format!("ADMIN#{}", admin_id);

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(pk.clone()))
        .key("SK", AttributeValue::S(pk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(())
}
