use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{CreateProductRecord, Product, UpdateProductRecord};

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn parse_string_list(item: &HashMap<String, AttributeValue>, field: &str) -> Vec<String> {
    item.get(field)
        .and_then(|v| v.as_l().ok())
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_product(product_id: &str, item: &HashMap<String, AttributeValue>) -> Product {
    Product {
        product_id: product_id.to_string(),
        name: item.get("name").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        description: item.get("description").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        category: item.get("category").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        colors: parse_string_list(item, "colors"),
        price: item.get("price").and_then(|v| v.as_s().ok()).map(|s| s.to_string()),
        images: parse_string_list(item, "images"),
        main_image: item.get("main_image").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        created_at: item.get("created_at").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        updated_at: item.get("updated_at").and_then(|v| v.as_s().ok()).map(|s| s.to_string()),
    }
}

/// Load the whole catalog, newest first (pure domain logic, no HTTP)
pub async fn list_products(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<Product>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S("PRODUCT".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut products = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(product_id) = sk.strip_prefix("PRODUCT#") {
                products.push(parse_product(product_id, item));
            }
        }
    }

    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(products)
}

/// Get a specific product
pub async fn get_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Product, String> {
    let sk = format!("PRODUCT#{}", product_id);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Ok(parse_product(product_id, item)),
        None => Err("Product not found".to_string()),
    }
}

/// Create a new catalog entry. The image fields come from the upload
/// pipeline's commit, already validated against the product invariants.
pub async fn create_product(
    client: &DynamoClient,
    table_name: &str,
    record: CreateProductRecord,
) -> Result<Product, String> {
    let product_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let sk = format!("PRODUCT#{}", product_id);

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S("PRODUCT".to_string()))
        .item("SK", AttributeValue::S(sk))
        .item("name", AttributeValue::S(record.name.clone()))
        .item("description", AttributeValue::S(record.description.clone()))
        .item("category", AttributeValue::S(record.category.clone()))
        .item("colors", string_list(&record.colors))
        .item("images", string_list(&record.images))
        .item("main_image", AttributeValue::S(record.main_image.clone()))
        .item("created_at", AttributeValue::S(now.clone()));

    if let Some(price) = &record.price {
        builder = builder.item("price", AttributeValue::S(price.clone()));
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(Product {
        product_id,
        name: record.name,
        description: record.description,
        category: record.category,
        colors: record.colors,
        price: record.price,
        images: record.images,
        main_image: record.main_image,
        created_at: now,
        updated_at: None,
    })
}

/// Update a product in place
pub async fn update_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
    record: UpdateProductRecord,
) -> Result<Product, String> {
    let sk = format!("PRODUCT#{}", product_id);

    let mut update_expr = vec![];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    if let Some(name) = record.name {
        update_expr.push("#name = :name");
        expr_names.insert("#name".to_string(), "name".to_string());
        expr_values.insert(":name".to_string(), AttributeValue::S(name));
    }

    if let Some(description) = record.description {
        update_expr.push("description = :description");
        expr_values.insert(":description".to_string(), AttributeValue::S(description));
    }

    if let Some(category) = record.category {
        update_expr.push("category = :category");
        expr_values.insert(":category".to_string(), AttributeValue::S(category));
    }

    if let Some(colors) = record.colors {
        update_expr.push("colors = :colors");
        expr_values.insert(":colors".to_string(), string_list(&colors));
    }

    if let Some(price) = record.price {
        update_expr.push("price = :price");
        expr_values.insert(":price".to_string(), AttributeValue::S(price));
    }

    if let Some(images) = record.images {
        update_expr.push("images = :images");
        expr_values.insert(":images".to_string(), string_list(&images));
    }

    if let Some(main_image) = record.main_image {
        update_expr.push("main_image = :main_image");
        expr_values.insert(":main_image".to_string(), AttributeValue::S(main_image));
    }

    if !update_expr.is_empty() {
        update_expr.push("updated_at = :updated_at");
        expr_values.insert(
            ":updated_at".to_string(),
            AttributeValue::S(chrono::Utc::now().to_rfc3339()),
        );

        let mut builder = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S("PRODUCT".to_string()))
            .key("SK", AttributeValue::S(sk))
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

    get_product(client, table_name, product_id).await
}

/// Delete a product record, returning it so the caller can clean up its
/// stored images.
pub async fn delete_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Product, String> {
    let product = get_product(client, table_name, product_id).await?;
    let sk = format!("PRODUCT#{}", product_id);

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(product)
}
