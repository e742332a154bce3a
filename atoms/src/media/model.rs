use serde::Serialize;

/// Lifecycle of one image inside an upload session.
/// pending -> uploading -> uploaded, or uploading -> errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Uploading,
    Uploaded,
    Errored,
}

/// A file the admin selected, as received by the API (already base64-decoded).
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Ephemeral preview handle for rendering a thumbnail before/while the
/// upload runs. Must be released on every exit path (removal, teardown,
/// commit) - an unreleased preview keeps the decoded bytes alive.
#[derive(Debug, Clone)]
pub struct Preview {
    pub preview_id: String,
    bytes: Vec<u8>,
    released: bool,
}

impl Preview {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            preview_id: uuid::Uuid::new_v4().to_string(),
            bytes,
            released: false,
        }
    }

    /// Resolve the preview bytes. None once released.
    pub fn bytes(&self) -> Option<&[u8]> {
        if self.released {
            None
        } else {
            Some(&self.bytes)
        }
    }

    pub fn release(&mut self) {
        self.bytes = Vec::new();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// One image in flight or already attached to a product.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Raw local file, absent for images that were already persisted.
    pub source: Option<LocalFile>,
    pub preview: Option<Preview>,
    /// Object-storage URL once the upload succeeded.
    pub remote_url: Option<String>,
    pub status: ItemStatus,
    /// 0-100, non-decreasing while uploading.
    pub progress_percent: u8,
    pub error_detail: Option<String>,
    /// True if the image was attached to the product before this edit
    /// session began. Affects deletion semantics: preexisting removals are
    /// staged until commit, fresh removals delete the object immediately.
    pub preexisting: bool,
}

impl UploadItem {
    /// A freshly selected file, not yet uploading.
    pub fn pending(file: LocalFile) -> Self {
        let preview = Preview::new(file.data.clone());
        Self {
            source: Some(file),
            preview: Some(preview),
            remote_url: None,
            status: ItemStatus::Pending,
            progress_percent: 0,
            error_detail: None,
            preexisting: false,
        }
    }

    /// An image already persisted on the product when the session opened.
    pub fn preexisting(url: String) -> Self {
        Self {
            source: None,
            preview: None,
            remote_url: Some(url),
            status: ItemStatus::Uploaded,
            progress_percent: 100,
            error_detail: None,
            preexisting: true,
        }
    }

    /// The persisted URL for this item, present for uploaded and
    /// preexisting items only.
    pub fn resolved_url(&self) -> Option<&str> {
        match self.status {
            ItemStatus::Uploaded => self.remote_url.as_deref(),
            _ => None,
        }
    }

    /// Eligible to be the product's main image.
    pub fn is_attached(&self) -> bool {
        self.status == ItemStatus::Uploaded
    }
}

/// Progress and terminal values emitted by the batch coordinator.
/// `index` is the file's position within the batch that emitted the event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    Progress { index: usize, percent: u8 },
    Done { index: usize, url: String },
    Failed { index: usize, error: String },
}

/// Terminal per-file result of a batch, in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { url: String },
    Failed { error: String },
}

impl UploadOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            UploadOutcome::Uploaded { url } => Some(url),
            UploadOutcome::Failed { .. } => None,
        }
    }
}
