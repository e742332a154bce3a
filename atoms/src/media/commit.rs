use super::session::UploadSession;
use super::store::ObjectStore;

/// The image fields written onto the product record.
#[derive(Debug, Clone)]
pub struct CommittedImages {
    /// Ordered list of persisted URLs.
    pub images: Vec<String>,
    /// Member of `images`.
    pub main_image: String,
}

/// Flatten a session into the product's image fields, consuming it.
///
/// Deletes every staged URL first - a failed staged delete is logged and
/// skipped so a dangling remote object never blocks saving the record.
/// Then collects the surviving items' URLs in order and resolves the main
/// image, defaulting to the first entry when no explicit selection
/// survived. Every preview still outstanding is released before returning.
pub async fn commit(
    mut session: UploadSession,
    store: &dyn ObjectStore,
) -> Result<CommittedImages, String> {
    if session.is_uploading() {
        session.dispose();
        return Err("Cannot save while images are still uploading".to_string());
    }

    let staged = std::mem::take(&mut session.staged_deletions);
    for url in staged {
        if let Err(e) = store.delete(&url).await {
            tracing::warn!("Failed to delete staged image {}: {}", url, e);
        }
    }

    let images: Vec<String> = session
        .items
        .iter()
        .filter_map(|item| item.resolved_url().map(str::to_string))
        .collect();

    if images.is_empty() {
        session.dispose();
        return Err("A product needs at least one image".to_string());
    }

    let main_image = session
        .main_url()
        .map(str::to_string)
        .unwrap_or_else(|| images[0].clone());

    session.dispose();

    Ok(CommittedImages { images, main_image })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::compress::CompressOptions;
    use crate::media::model::UploadEvent;
    use crate::media::store::mock::MockStore;
    use crate::media::testutil::jpeg_file;
    use crate::media::upload::upload_many;
    use tokio::sync::mpsc;

    async fn upload_into(session: &mut UploadSession, store: &MockStore, count: usize) {
        let files: Vec<_> = (0..count)
            .map(|i| jpeg_file(&format!("img-{}.jpg", i)))
            .collect();
        let base = session.append_files(&files);
        session.begin_upload(base, files.len());
        let (tx, mut rx) = mpsc::unbounded_channel();
        upload_many(store, None, &files, &CompressOptions::default(), &tx).await;
        drop(tx);
        while let Some(event) = rx.recv().await {
            session.apply_event(base, &event);
        }
    }

    #[tokio::test]
    async fn three_file_create_commits_in_selection_order() {
        let store = MockStore::new();
        let mut session = UploadSession::new();
        upload_into(&mut session, &store, 3).await;

        let urls: Vec<String> = session
            .items()
            .iter()
            .map(|i| i.remote_url.clone().unwrap())
            .collect();

        let committed = commit(session, &store).await.unwrap();
        assert_eq!(committed.images, urls);
        assert_eq!(committed.main_image, urls[0]);
    }

    #[tokio::test]
    async fn edit_with_removal_and_new_upload() {
        // Product has [u1, u2] with main u1; remove u1, add one new file.
        let images = vec![
            "https://assets.test/u1".to_string(),
            "https://assets.test/u2".to_string(),
        ];
        let store = MockStore::new();
        let mut session = UploadSession::from_product(&images, "https://assets.test/u1");

        session.remove_item(0, &store).await.unwrap();
        upload_into(&mut session, &store, 1).await;
        let u3 = session.items()[1].remote_url.clone().unwrap();

        let committed = commit(session, &store).await.unwrap();

        // u1 deleted exactly once, at commit time.
        assert_eq!(store.deleted_urls(), vec!["https://assets.test/u1".to_string()]);
        assert_eq!(committed.images, vec!["https://assets.test/u2".to_string(), u3]);
        // Old main was removed and nothing was explicitly selected:
        // fallback to the first surviving image.
        assert_eq!(committed.main_image, "https://assets.test/u2");
    }

    #[tokio::test]
    async fn failed_staged_delete_is_skipped_not_fatal() {
        let images = vec![
            "https://assets.test/poison".to_string(),
            "https://assets.test/u2".to_string(),
        ];
        let mut store = MockStore::new();
        store.fail_delete_containing = Some("poison".to_string());
        let mut session = UploadSession::from_product(&images, "https://assets.test/u2");

        session.remove_item(0, &store).await.unwrap();
        let committed = commit(session, &store).await.unwrap();

        assert_eq!(committed.images, vec!["https://assets.test/u2".to_string()]);
        assert_eq!(committed.main_image, "https://assets.test/u2");
    }

    #[tokio::test]
    async fn commit_refuses_while_uploading() {
        let store = MockStore::new();
        let mut session = UploadSession::new();
        let base = session.append_files(&[jpeg_file("slow.jpg")]);
        session.begin_upload(base, 1);

        let err = commit(session, &store).await.unwrap_err();
        assert!(err.contains("still uploading"));
    }

    #[tokio::test]
    async fn errored_items_never_reach_the_record() {
        let store = MockStore::new();
        let mut session = UploadSession::new();
        upload_into(&mut session, &store, 1).await;

        let base = session.append_files(&[jpeg_file("late.jpg")]);
        session.begin_upload(base, 1);
        session.apply_event(
            base,
            &UploadEvent::Failed {
                index: 0,
                error: "network".to_string(),
            },
        );

        let good = session.items()[0].remote_url.clone().unwrap();
        let committed = commit(session, &store).await.unwrap();
        assert_eq!(committed.images, vec![good]);
    }
}
