use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client as S3Client;

/// Transport-level progress, 0-100 for one object.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// The object-storage collaborator the upload pipeline talks to. Keys are
/// hierarchical strings scoped by product identifier; `put` resolves to a
/// publicly fetchable URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<String, String>;

    async fn delete(&self, url: &str) -> Result<(), String>;
}

/// Objects larger than this go through a multipart upload so the transport
/// can report per-part progress.
const MULTIPART_THRESHOLD: usize = 5 * 1024 * 1024;
const PART_SIZE: usize = 5 * 1024 * 1024;

/// S3-backed store. Public URLs use the virtual-hosted style
/// `https://{bucket}.s3.amazonaws.com/{key}`.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
    }

    async fn put_single(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| format!("S3 put_object error: {}", e))?;
        Ok(())
    }

    async fn put_multipart(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<(), String> {
        let create = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| format!("S3 create_multipart_upload error: {}", e))?;

        let upload_id = create
            .upload_id()
            .ok_or_else(|| "S3 returned no upload id".to_string())?
            .to_string();

        let chunks: Vec<&[u8]> = data.chunks(PART_SIZE).collect();
        let total_parts = chunks.len();
        let mut completed_parts = Vec::with_capacity(total_parts);

        for (i, chunk) in chunks.into_iter().enumerate() {
            let part_number = (i + 1) as i32;
            let result = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk.to_vec()))
                .send()
                .await;

            let part = match result {
                Ok(part) => part,
                Err(e) => {
                    // Abandon the upload; leftover parts are cleaned up by
                    // the bucket's lifecycle rule.
                    let _ = self
                        .client
                        .abort_multipart_upload()
                        .bucket(&self.bucket)
                        .key(key)
                        .upload_id(&upload_id)
                        .send()
                        .await;
                    return Err(format!("S3 upload_part error: {}", e));
                }
            };

            completed_parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(part.e_tag().map(|t| t.to_string()))
                    .build(),
            );

            on_progress((((i + 1) * 100) / total_parts) as u8);
        }

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| format!("S3 complete_multipart_upload error: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<String, String> {
        if data.len() > MULTIPART_THRESHOLD {
            self.put_multipart(key, data, content_type, on_progress)
                .await?;
        } else {
            self.put_single(key, data, content_type).await?;
            on_progress(100);
        }
        Ok(self.public_url(key))
    }

    async fn delete(&self, url: &str) -> Result<(), String> {
        let (bucket, key) =
            parse_bucket_and_key(url).ok_or_else(|| format!("Not an S3 URL: {}", url))?;

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| format!("S3 delete_object error: {}", e))?;
        Ok(())
    }
}

/// Parse bucket and key from an S3 URL like https://bucket.s3.amazonaws.com/key
/// or https://s3.<region>.amazonaws.com/bucket/key
fn parse_bucket_and_key(url: &str) -> Option<(String, String)> {
    let no_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let (host, path) = no_scheme.split_once('/')?;

    if host.starts_with("s3.") {
        // Format: s3.region.amazonaws.com/bucket/key
        let (bucket, key) = path.split_once('/')?;
        Some((bucket.to_string(), key.to_string()))
    } else {
        // Format: bucket.s3.amazonaws.com/key
        Some((host.split(".s3").next()?.to_string(), path.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store that records every put/delete and plays back a
    /// fixed sequence of transport progress ticks.
    pub struct MockStore {
        pub puts: Mutex<Vec<String>>,
        pub deletes: Mutex<Vec<String>>,
        pub progress_ticks: Vec<u8>,
        /// Keys containing this substring fail their put.
        pub fail_put_containing: Option<String>,
        /// URLs containing this substring fail their delete.
        pub fail_delete_containing: Option<String>,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                deletes: Mutex::new(Vec::new()),
                progress_ticks: vec![25, 50, 75, 100],
                fail_put_containing: None,
                fail_delete_containing: None,
            }
        }

        pub fn url_for(key: &str) -> String {
            format!("https://assets.test/{}", key)
        }

        pub fn put_count(&self) -> usize {
            self.puts.lock().unwrap().len()
        }

        pub fn deleted_urls(&self) -> Vec<String> {
            self.deletes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStore for MockStore {
        async fn put(
            &self,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
            on_progress: ProgressFn<'_>,
        ) -> Result<String, String> {
            if let Some(needle) = &self.fail_put_containing {
                if key.contains(needle.as_str()) {
                    return Err("simulated transport failure".to_string());
                }
            }
            for tick in &self.progress_ticks {
                on_progress(*tick);
            }
            self.puts.lock().unwrap().push(key.to_string());
            Ok(Self::url_for(key))
        }

        async fn delete(&self, url: &str) -> Result<(), String> {
            if let Some(needle) = &self.fail_delete_containing {
                if url.contains(needle.as_str()) {
                    return Err("simulated delete failure".to_string());
                }
            }
            self.deletes.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_virtual_hosted_url() {
        let (bucket, key) =
            parse_bucket_and_key("https://corium-assets.s3.amazonaws.com/products/p1/a.jpg")
                .unwrap();
        assert_eq!(bucket, "corium-assets");
        assert_eq!(key, "products/p1/a.jpg");
    }

    #[test]
    fn parses_path_style_url() {
        let (bucket, key) =
            parse_bucket_and_key("https://s3.ap-southeast-2.amazonaws.com/corium-assets/x.jpg")
                .unwrap();
        assert_eq!(bucket, "corium-assets");
        assert_eq!(key, "x.jpg");
    }

    #[test]
    fn rejects_url_without_path() {
        assert!(parse_bucket_and_key("https://corium-assets.s3.amazonaws.com").is_none());
    }
}
