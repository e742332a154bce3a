use tokio::sync::mpsc::UnboundedSender;

use super::compress::{self, CompressOptions};
use super::model::{LocalFile, UploadEvent, UploadOutcome};
use super::store::ObjectStore;

/// Namespace for objects uploaded before their product exists. Abandoned
/// objects here are harmless and reconciled out-of-band.
pub const TEMP_NAMESPACE: &str = "uploads/tmp";

/// Progress reported once validation and compression are done; the
/// remaining 10-100 range belongs to the transport.
const PREPARED_PERCENT: u8 = 10;

/// Collision-resistant object key: millisecond timestamp plus a random
/// suffix, namespaced under the product when its id is known.
pub fn object_key(product_id: Option<&str>, extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    match product_id {
        Some(id) => format!("products/{}/{}-{}.{}", id, millis, suffix, extension),
        None => format!("{}/{}-{}.{}", TEMP_NAMESPACE, millis, suffix, extension),
    }
}

fn scale_transport(percent: u8) -> u8 {
    PREPARED_PERCENT + ((percent.min(100) as u16 * 90) / 100) as u8
}

/// Upload a single file: validate -> compress -> store -> resolve URL.
/// Progress lands in 0-10 for preparation and 10-100 for transport,
/// ending at exactly 100 on success. No internal retries - a failed file
/// is surfaced to the user to re-select.
pub async fn upload_one(
    store: &dyn ObjectStore,
    product_id: Option<&str>,
    file: &LocalFile,
    opts: &CompressOptions,
    on_progress: &(dyn Fn(u8) + Send + Sync),
) -> Result<String, String> {
    compress::validate(file)?;

    let prepared = compress::compress(file, opts);
    on_progress(PREPARED_PERCENT);

    let key = object_key(product_id, &prepared.extension);
    let url = store
        .put(&key, prepared.data, &prepared.content_type, &|transport| {
            on_progress(scale_transport(transport))
        })
        .await?;

    on_progress(100);
    Ok(url)
}

/// Drive `upload_one` over an ordered list of files, strictly one at a
/// time so batch indices stay stable and deterministic. A single file's
/// failure does not abort the batch; the returned outcomes preserve input
/// order, one entry per file. Progress and terminal values are delivered
/// on the event channel with the file's index within this batch.
pub async fn upload_many(
    store: &dyn ObjectStore,
    product_id: Option<&str>,
    files: &[LocalFile],
    opts: &CompressOptions,
    events: &UnboundedSender<UploadEvent>,
) -> Vec<UploadOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        let progress = |percent: u8| {
            let _ = events.send(UploadEvent::Progress { index, percent });
        };

        match upload_one(store, product_id, file, opts, &progress).await {
            Ok(url) => {
                let _ = events.send(UploadEvent::Done {
                    index,
                    url: url.clone(),
                });
                outcomes.push(UploadOutcome::Uploaded { url });
            }
            Err(error) => {
                tracing::error!("Upload failed for {}: {}", file.file_name, error);
                // Terminal event goes out before the outcome is recorded so
                // observers on the progress channel never see a file stuck
                // in pending.
                let _ = events.send(UploadEvent::Failed {
                    index,
                    error: error.clone(),
                });
                outcomes.push(UploadOutcome::Failed { error });
            }
        }
    }

    outcomes
}

/// Convenience view of a batch's successful URLs, in input order. Callers
/// needing per-item error detail consume the full outcome list.
pub fn successful_urls(outcomes: &[UploadOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|o| o.url().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::store::mock::MockStore;
    use crate::media::testutil::jpeg_file;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<UploadEvent>) -> Vec<UploadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn object_key_is_namespaced_by_product() {
        let key = object_key(Some("p-42"), "jpg");
        assert!(key.starts_with("products/p-42/"));
        assert!(key.ends_with(".jpg"));

        let tmp = object_key(None, "png");
        assert!(tmp.starts_with("uploads/tmp/"));
    }

    #[test]
    fn object_keys_do_not_collide() {
        let a = object_key(Some("p-1"), "jpg");
        let b = object_key(Some("p-1"), "jpg");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn progress_is_monotone_and_ends_at_100() {
        let store = MockStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcomes = upload_many(
            &store,
            Some("p-1"),
            &[jpeg_file("belt.jpg")],
            &CompressOptions::default(),
            &tx,
        )
        .await;

        assert!(matches!(outcomes[0], UploadOutcome::Uploaded { .. }));

        let mut last = 0u8;
        let mut terminal = None;
        for event in drain(&mut rx) {
            match event {
                UploadEvent::Progress { percent, .. } => {
                    assert!(percent >= last, "progress went backwards: {} -> {}", last, percent);
                    last = percent;
                }
                other => terminal = Some(other),
            }
        }
        assert_eq!(last, 100);
        assert!(matches!(terminal, Some(UploadEvent::Done { .. })));
    }

    #[tokio::test]
    async fn batch_outcomes_preserve_input_order() {
        let store = MockStore::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let files = vec![jpeg_file("a.jpg"), jpeg_file("b.jpg"), jpeg_file("c.jpg")];
        let outcomes =
            upload_many(&store, Some("p-1"), &files, &CompressOptions::default(), &tx).await;

        assert_eq!(outcomes.len(), 3);
        let urls = successful_urls(&outcomes);
        assert_eq!(urls.len(), 3);
        // Sequential processing: recorded puts follow input order.
        let puts = store.puts.lock().unwrap().clone();
        assert_eq!(urls[0], MockStore::url_for(&puts[0]));
        assert_eq!(urls[1], MockStore::url_for(&puts[1]));
        assert_eq!(urls[2], MockStore::url_for(&puts[2]));
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let store = MockStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let bad = LocalFile {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: vec![1, 2, 3],
        };
        let files = vec![jpeg_file("first.jpg"), bad, jpeg_file("third.jpg")];
        let outcomes =
            upload_many(&store, None, &files, &CompressOptions::default(), &tx).await;

        assert!(matches!(outcomes[0], UploadOutcome::Uploaded { .. }));
        assert!(matches!(outcomes[1], UploadOutcome::Failed { .. }));
        assert!(matches!(outcomes[2], UploadOutcome::Uploaded { .. }));
        assert_eq!(store.put_count(), 2);

        // The failed file got a terminal event on the channel.
        let failed = drain(&mut rx).into_iter().any(|e| {
            matches!(e, UploadEvent::Failed { index: 1, .. })
        });
        assert!(failed);
    }

    #[tokio::test]
    async fn validation_failure_rejects_with_readable_message() {
        let store = MockStore::new();
        let oversized = LocalFile {
            file_name: "huge.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0; crate::media::compress::MAX_FILE_SIZE + 1],
        };
        let err = upload_one(
            &store,
            None,
            &oversized,
            &CompressOptions::default(),
            &|_| {},
        )
        .await
        .unwrap_err();
        assert!(err.contains("too large"));
        assert_eq!(store.put_count(), 0);
    }
}
