use super::model::{ItemStatus, LocalFile, UploadEvent, UploadItem};
use super::store::ObjectStore;

/// Screen-local state for one product's images across an add or edit
/// session: the ordered item list, the main-image selection, and remote
/// URLs staged for deletion at commit time. Created when the admin screen
/// opens, consumed exactly once at submit.
#[derive(Debug, Default)]
pub struct UploadSession {
    pub(crate) items: Vec<UploadItem>,
    pub(crate) main_index: Option<usize>,
    pub(crate) staged_deletions: Vec<String>,
}

impl UploadSession {
    /// Empty session for the "add product" flow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for the "edit product" flow: every persisted URL becomes a
    /// preexisting item in stored order, and the main selection follows
    /// the product's main image.
    pub fn from_product(images: &[String], main_image: &str) -> Self {
        let items: Vec<UploadItem> = images
            .iter()
            .map(|url| UploadItem::preexisting(url.clone()))
            .collect();
        let main_index = match images.iter().position(|url| url == main_image) {
            Some(i) => Some(i),
            None if !items.is_empty() => Some(0),
            None => None,
        };
        Self {
            items,
            main_index,
            staged_deletions: Vec::new(),
        }
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn main_index(&self) -> Option<usize> {
        self.main_index
    }

    pub fn main_url(&self) -> Option<&str> {
        self.main_index
            .and_then(|i| self.items.get(i))
            .and_then(|item| item.resolved_url())
    }

    pub fn staged_deletions(&self) -> &[String] {
        &self.staged_deletions
    }

    pub fn is_uploading(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status == ItemStatus::Uploading)
    }

    pub fn has_errored(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status == ItemStatus::Errored)
    }

    /// At least one item that would survive a commit.
    pub fn has_attached(&self) -> bool {
        self.items.iter().any(|item| item.is_attached())
    }

    /// Append newly selected files as pending items and return the base
    /// index of this batch: batch index `i` maps to item `base + i`.
    pub fn append_files(&mut self, files: &[LocalFile]) -> usize {
        let base = self.items.len();
        for file in files {
            self.items.push(UploadItem::pending(file.clone()));
        }
        base
    }

    /// Mark a whole batch as uploading once the coordinator takes over.
    pub fn begin_upload(&mut self, base: usize, count: usize) {
        for item in self.items.iter_mut().skip(base).take(count) {
            if item.status == ItemStatus::Pending {
                item.status = ItemStatus::Uploading;
            }
        }
    }

    /// Fold one coordinator event back into the item list. `base` is the
    /// value `append_files` returned for the event's batch.
    pub fn apply_event(&mut self, base: usize, event: &UploadEvent) {
        match event {
            UploadEvent::Progress { index, percent } => {
                if let Some(item) = self.items.get_mut(base + index) {
                    if item.status == ItemStatus::Uploading {
                        // Monotone: a late tick never rolls progress back.
                        item.progress_percent = item.progress_percent.max(*percent);
                    }
                }
            }
            UploadEvent::Done { index, url } => {
                let abs = base + index;
                if let Some(item) = self.items.get_mut(abs) {
                    item.status = ItemStatus::Uploaded;
                    item.remote_url = Some(url.clone());
                    item.progress_percent = 100;
                    item.error_detail = None;
                    if self.main_index.is_none() {
                        self.main_index = Some(abs);
                    }
                }
            }
            UploadEvent::Failed { index, error } => {
                if let Some(item) = self.items.get_mut(base + index) {
                    item.status = ItemStatus::Errored;
                    item.error_detail = Some(error.clone());
                }
            }
        }
    }

    /// Designate the main image. The item must be uploaded or preexisting.
    pub fn set_main(&mut self, index: usize) -> Result<(), String> {
        let item = self
            .items
            .get(index)
            .ok_or_else(|| format!("No image at position {}", index))?;
        if !item.is_attached() {
            return Err("Main image must be an uploaded image".to_string());
        }
        self.main_index = Some(index);
        Ok(())
    }

    /// Remove an item from the session.
    ///
    /// Preexisting images are staged for deletion at commit time, so a
    /// cancelled edit never destroys data. Images uploaded during this
    /// session have no other referent yet and are deleted remotely right
    /// away. The preview handle is released on every removal, and the main
    /// selection falls back to the first remaining attached item.
    pub async fn remove_item(
        &mut self,
        index: usize,
        store: &dyn ObjectStore,
    ) -> Result<(), String> {
        if index >= self.items.len() {
            return Err(format!("No image at position {}", index));
        }
        if self.items.len() <= 1 {
            return Err("A product must keep at least one image".to_string());
        }

        let item = &mut self.items[index];

        if item.preexisting {
            if let Some(url) = &item.remote_url {
                self.staged_deletions.push(url.clone());
            }
        } else if item.status == ItemStatus::Uploaded {
            if let Some(url) = &item.remote_url {
                if let Err(e) = store.delete(url).await {
                    // The object becomes an orphan; never block the removal.
                    tracing::warn!("Failed to delete {}: {}", url, e);
                }
            }
        }

        if let Some(preview) = &mut item.preview {
            preview.release();
        }

        self.items.remove(index);

        self.main_index = match self.main_index {
            Some(main) if main == index => {
                self.items.iter().position(|item| item.is_attached())
            }
            Some(main) if main > index => Some(main - 1),
            other => other,
        };

        Ok(())
    }

    /// Release every outstanding preview handle. Called on teardown paths
    /// and after commit; newly uploaded but unsubmitted objects stay
    /// behind as namespaced orphans.
    pub fn dispose(&mut self) {
        for item in &mut self.items {
            if let Some(preview) = &mut item.preview {
                preview.release();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::compress::CompressOptions;
    use crate::media::store::mock::MockStore;
    use crate::media::testutil::jpeg_file;
    use crate::media::upload::upload_many;
    use tokio::sync::mpsc;

    /// Append files and run them through the real coordinator, folding
    /// the event stream back into the session.
    async fn upload_into(
        session: &mut UploadSession,
        store: &MockStore,
        files: Vec<crate::media::model::LocalFile>,
    ) {
        let base = session.append_files(&files);
        session.begin_upload(base, files.len());
        let (tx, mut rx) = mpsc::unbounded_channel();
        upload_many(store, None, &files, &CompressOptions::default(), &tx).await;
        drop(tx);
        while let Some(event) = rx.recv().await {
            session.apply_event(base, &event);
        }
    }

    #[test]
    fn edit_session_mirrors_the_persisted_product() {
        let images = vec!["https://assets.test/u1".to_string(), "https://assets.test/u2".to_string()];
        let session = UploadSession::from_product(&images, "https://assets.test/u2");

        assert_eq!(session.len(), 2);
        assert!(session.items()[0].preexisting);
        assert_eq!(session.main_index(), Some(1));
        assert_eq!(session.main_url(), Some("https://assets.test/u2"));
    }

    #[tokio::test]
    async fn removing_preexisting_item_is_deferred() {
        let images = vec!["https://assets.test/u1".to_string(), "https://assets.test/u2".to_string()];
        let mut session = UploadSession::from_product(&images, "https://assets.test/u1");
        let store = MockStore::new();

        session.remove_item(0, &store).await.unwrap();

        // No remote delete yet - only staged.
        assert!(store.deleted_urls().is_empty());
        assert_eq!(session.staged_deletions(), &["https://assets.test/u1".to_string()]);
        assert_eq!(session.len(), 1);
    }

    #[tokio::test]
    async fn removing_fresh_upload_deletes_immediately() {
        let mut session = UploadSession::new();
        let store = MockStore::new();
        upload_into(&mut session, &store, vec![jpeg_file("a.jpg"), jpeg_file("b.jpg")]).await;

        let url = session.items()[1].remote_url.clone().unwrap();
        session.remove_item(1, &store).await.unwrap();

        assert_eq!(store.deleted_urls(), vec![url]);
        assert!(session.staged_deletions().is_empty());
    }

    #[tokio::test]
    async fn last_item_cannot_be_removed() {
        let images = vec!["https://assets.test/u1".to_string()];
        let mut session = UploadSession::from_product(&images, "https://assets.test/u1");
        let store = MockStore::new();

        let err = session.remove_item(0, &store).await.unwrap_err();
        assert!(err.contains("at least one image"));
        // Session unchanged.
        assert_eq!(session.len(), 1);
        assert_eq!(session.main_index(), Some(0));
        assert!(store.deleted_urls().is_empty());
    }

    #[tokio::test]
    async fn main_selection_survives_adds_and_removals() {
        let mut session = UploadSession::new();
        let store = MockStore::new();

        upload_into(&mut session, &store, vec![jpeg_file("a.jpg"), jpeg_file("b.jpg")]).await;
        // First uploaded item became main by default.
        assert_eq!(session.main_index(), Some(0));
        assert!(session.items()[0].is_attached());

        session.set_main(1).unwrap();
        assert_eq!(session.main_index(), Some(1));

        // Removing the main falls back to the first attached item.
        session.remove_item(1, &store).await.unwrap();
        assert_eq!(session.main_index(), Some(0));
        assert!(session.items()[session.main_index().unwrap()].is_attached());
    }

    #[tokio::test]
    async fn main_cannot_reference_an_errored_item() {
        let mut session = UploadSession::new();
        let store = MockStore::new();
        let bad = crate::media::model::LocalFile {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: vec![1],
        };
        upload_into(&mut session, &store, vec![jpeg_file("a.jpg"), bad]).await;

        assert_eq!(session.items()[1].status, ItemStatus::Errored);
        assert!(session.set_main(1).is_err());
        assert_eq!(session.main_index(), Some(0));
    }

    #[tokio::test]
    async fn removal_and_dispose_release_previews() {
        let mut session = UploadSession::new();
        let store = MockStore::new();
        upload_into(&mut session, &store, vec![jpeg_file("a.jpg"), jpeg_file("b.jpg")]).await;

        assert!(session.items()[0].preview.as_ref().map_or(false, |p| !p.is_released()));

        session.remove_item(1, &store).await.unwrap();
        session.dispose();
        for item in session.items() {
            assert!(item.preview.as_ref().map_or(true, |p| p.is_released()));
        }
    }

    #[tokio::test]
    async fn progress_events_roll_forward_only() {
        let mut session = UploadSession::new();
        let base = session.append_files(&[jpeg_file("a.jpg")]);
        session.begin_upload(base, 1);

        session.apply_event(base, &UploadEvent::Progress { index: 0, percent: 40 });
        session.apply_event(base, &UploadEvent::Progress { index: 0, percent: 20 });
        assert_eq!(session.items()[0].progress_percent, 40);
    }
}
