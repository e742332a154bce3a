// ========== PRODUCT ==========
pub use corium_atoms::products::model::{CreateProductRecord, Product, UpdateProductRecord};

// ========== MESSAGE ==========
pub use corium_atoms::messages::model::{ContactMessage, CreateMessagePayload, UpdateMessagePayload};

// ========== ADMIN ==========
pub use corium_atoms::admins::model::{Admin, CreateAdminPayload, UpdateAdminPayload};

// ========== UPLOAD PIPELINE ==========
pub use corium_atoms::media::model::{
    ItemStatus, LocalFile, UploadEvent, UploadItem, UploadOutcome,
};
pub use corium_atoms::media::{CommittedImages, UploadSession};
