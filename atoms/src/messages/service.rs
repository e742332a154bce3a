use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{ContactMessage, CreateMessagePayload};

fn parse_message(message_id: &str, item: &HashMap<String, AttributeValue>) -> ContactMessage {
    ContactMessage {
        message_id: message_id.to_string(),
        name: item.get("name").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        email: item.get("email").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        phone: item.get("phone").and_then(|v| v.as_s().ok()).map(|s| s.to_string()),
        body: item.get("body").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        read: item.get("read").and_then(|v| v.as_bool().ok()).copied().unwrap_or(false),
        created_at: item.get("created_at").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
    }
}

/// Persist a new contact lead
pub async fn create_message(
    client: &DynamoClient,
    table_name: &str,
    payload: CreateMessagePayload,
) -> Result<ContactMessage, String> {
    let message_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let sk = format!("MESSAGE#{}", message_id);

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S("MESSAGE".to_string()))
        .item("SK", AttributeValue::S(sk))
        .item("name", AttributeValue::S(payload.name.clone()))
        .item("email", AttributeValue::S(payload.email.clone()))
        .item("body", AttributeValue::S(payload.body.clone()))
        .item("read", AttributeValue::Bool(false))
        .item("created_at", AttributeValue::S(now.clone()));

    if let Some(phone) = &payload.phone {
        builder = builder.item("phone", AttributeValue::S(phone.clone()));
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(ContactMessage {
        message_id,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        body: payload.body,
        read: false,
        created_at: now,
    })
}

/// List every contact lead, newest first
pub async fn list_messages(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<ContactMessage>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S("MESSAGE".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut messages = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(message_id) = sk.strip_prefix("MESSAGE#") {
                messages.push(parse_message(message_id, item));
            }
        }
    }

    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(messages)
}

/// Get a specific contact lead
pub async fn get_message(
    client: &DynamoClient,
    table_name: &str,
    message_id: &str,
) -> Result<ContactMessage, String> {
    let sk = format!("MESSAGE#{}", message_id);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("MESSAGE".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Ok(parse_message(message_id, item)),
        None => Err("Message not found".to_string()),
    }
}

/// Flip the read flag on a lead
pub async fn set_read(
    client: &DynamoClient,
    table_name: &str,
    message_id: &str,
    read: bool,
) -> Result<ContactMessage, String> {
    let sk = format!("MESSAGE#{}", message_id);

    client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("MESSAGE".to_string()))
        .key("SK", AttributeValue::S(sk))
        .update_expression("SET #read = :read")
        .expression_attribute_names("#read", "read")
        .expression_attribute_values(":read", AttributeValue::Bool(read))
        .send()
        .await
        .map_err(|e| format!("DynamoDB update_item error: {}", e))?;

    get_message(client, table_name, message_id).await
}

/// Delete a contact lead
pub async fn delete_message(
    client: &DynamoClient,
    table_name: &str,
    message_id: &str,
) -> Result<(), String> {
    let sk = format!("MESSAGE#{}", message_id);

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("MESSAGE".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(())
}
