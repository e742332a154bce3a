use serde::{Deserialize, Serialize};

/// Product domain model - one catalog entry on the storefront
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub colors: Vec<String>,
    /// Display price, no checkout behind it
    pub price: Option<String>,
    /// Ordered object-storage URLs
    pub images: Vec<String>,
    /// Always a member of `images`
    pub main_image: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateProductRecord {
    pub name: String,
    pub description: String,
    pub category: String,
    pub colors: Vec<String>,
    pub price: Option<String>,
    pub images: Vec<String>,
    pub main_image: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub colors: Option<Vec<String>>,
    pub price: Option<String>,
    pub images: Option<Vec<String>>,
    pub main_image: Option<String>,
}
