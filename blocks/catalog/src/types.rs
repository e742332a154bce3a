use serde::{Deserialize, Serialize};

use corium_atoms::media::UploadOutcome;
use corium_atoms::products::Product;

/// One newly selected image, shipped base64-encoded in the save request.
#[derive(Debug, Deserialize)]
pub struct NewImagePayload {
    pub file_name: String,
    pub content_type: String,
    pub data_base64: String,
}

/// Admin product-save request: the form fields plus everything the upload
/// session needs to replay the screen's image edits.
#[derive(Debug, Deserialize)]
pub struct SaveProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub colors: Vec<String>,
    pub price: Option<String>,
    /// Preexisting image URLs the admin removed during the edit.
    #[serde(default)]
    pub removed_images: Vec<String>,
    /// Explicit main selection by URL, for an image already on the product.
    pub main_image: Option<String>,
    /// Explicit main selection by position in `new_images`.
    pub main_upload_index: Option<usize>,
    #[serde(default)]
    pub new_images: Vec<NewImagePayload>,
}

#[derive(Debug, Serialize)]
pub struct SaveProductResponse {
    pub product: Product,
    /// One entry per file in `new_images`, in input order.
    pub upload_results: Vec<UploadOutcome>,
}

/// Business-rule validation for the save form. Image invariants are
/// checked separately once the session state is known.
pub fn validate_form(req: &SaveProductRequest) -> Result<(), String> {
    if req.name.trim().is_empty() {
        return Err("Product name is required".to_string());
    }
    if req.description.trim().is_empty() {
        return Err("Product description is required".to_string());
    }
    if req.category.trim().is_empty() {
        return Err("Product category is required".to_string());
    }
    if req.colors.iter().all(|c| c.trim().is_empty()) {
        return Err("At least one color is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SaveProductRequest {
        SaveProductRequest {
            name: "Weekender bag".to_string(),
            description: "Full-grain leather".to_string(),
            category: "bags".to_string(),
            colors: vec!["tan".to_string()],
            price: None,
            removed_images: vec![],
            main_image: None,
            main_upload_index: None,
            new_images: vec![],
        }
    }

    #[test]
    fn accepts_a_complete_form() {
        assert!(validate_form(&valid_request()).is_ok());
    }

    #[test]
    fn rejects_missing_fields() {
        let mut req = valid_request();
        req.name = "  ".to_string();
        assert!(validate_form(&req).is_err());

        let mut req = valid_request();
        req.colors = vec![];
        assert!(validate_form(&req).is_err());

        let mut req = valid_request();
        req.colors = vec!["".to_string()];
        assert!(validate_form(&req).is_err());
    }
}
