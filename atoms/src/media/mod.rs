// Image upload pipeline: validation/compression, single-file driver,
// sequential batch coordinator, session state, and commit.
pub mod commit;
pub mod compress;
pub mod model;
pub mod session;
pub mod store;
pub mod upload;

pub use commit::{commit, CommittedImages};
pub use compress::{compress, validate, CompressOptions};
pub use model::{ItemStatus, LocalFile, Preview, UploadEvent, UploadItem, UploadOutcome};
pub use session::UploadSession;
pub use store::{ObjectStore, S3ObjectStore};
pub use upload::{object_key, successful_urls, upload_many, upload_one};

#[cfg(test)]
pub(crate) mod testutil {
    use super::model::LocalFile;
    use std::io::Cursor;

    pub fn jpeg_file(name: &str) -> LocalFile {
        let img = image::RgbImage::from_pixel(64, 48, image::Rgb([90, 60, 30]));
        let mut data = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Jpeg)
            .unwrap();
        LocalFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data,
        }
    }
}
