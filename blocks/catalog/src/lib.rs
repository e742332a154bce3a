// Product-save workflow: composes the media pipeline and the products
// atom into the admin add/edit endpoints.
pub mod save;
pub mod types;

pub use save::{create_product_handler, update_product_handler};
pub use types::{NewImagePayload, SaveProductRequest, SaveProductResponse};
