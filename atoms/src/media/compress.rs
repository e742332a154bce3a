use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use super::model::LocalFile;

/// Maximum accepted file size (20MB)
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Raster formats accepted from the admin screens
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Bounds for the re-encoded copy of an uploaded image.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality factor
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: 1600,
            max_height: 1600,
            quality: 85,
        }
    }
}

/// Result of a compression pass. When re-encoding succeeded the data is
/// JPEG regardless of the input format; on decode/encode failure the
/// original bytes come back untouched.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub data: Vec<u8>,
    pub content_type: String,
    pub extension: String,
}

/// Reject files the pipeline will not accept: wrong MIME type or oversized.
pub fn validate(file: &LocalFile) -> Result<(), String> {
    if file.data.is_empty() {
        return Err("Empty file not allowed".to_string());
    }

    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(format!(
            "Unsupported file type: {}. Allowed: jpeg, png, webp",
            file.content_type
        ));
    }

    if file.data.len() > MAX_FILE_SIZE {
        return Err(format!(
            "File too large: {} bytes (max {})",
            file.data.len(),
            MAX_FILE_SIZE
        ));
    }

    Ok(())
}

/// Produce a resized, re-encoded copy bounded by the options. Never
/// upscales. Compression is a best-effort optimization: if the image
/// cannot be decoded or re-encoded, the original file is returned as-is.
pub fn compress(file: &LocalFile, opts: &CompressOptions) -> CompressedImage {
    let img = match image::load_from_memory(&file.data) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!(
                "Could not decode {} for compression, uploading original: {}",
                file.file_name,
                e
            );
            return original_copy(file);
        }
    };

    let (width, height) = (img.width(), img.height());
    let scale = f64::min(
        opts.max_width as f64 / width as f64,
        f64::min(opts.max_height as f64 / height as f64, 1.0),
    );

    let resized = if scale < 1.0 {
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        img.resize(new_width, new_height, FilterType::Lanczos3)
    } else {
        img
    };

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb = resized.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut cursor, opts.quality);
        if let Err(e) = rgb.write_with_encoder(encoder) {
            tracing::warn!(
                "Could not re-encode {}, uploading original: {}",
                file.file_name,
                e
            );
            return original_copy(file);
        }
    }

    CompressedImage {
        data: buffer,
        content_type: "image/jpeg".to_string(),
        extension: "jpg".to_string(),
    }
}

fn original_copy(file: &LocalFile) -> CompressedImage {
    CompressedImage {
        data: file.data.clone(),
        content_type: file.content_type.clone(),
        extension: extension_of(&file.file_name),
    }
}

/// Lower-cased extension of the original file name, defaulting to jpg.
pub fn extension_of(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_file(width: u32, height: u32) -> LocalFile {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
        let mut data = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .unwrap();
        LocalFile {
            file_name: "tote.png".to_string(),
            content_type: "image/png".to_string(),
            data,
        }
    }

    #[test]
    fn validate_rejects_wrong_mime_type() {
        let file = LocalFile {
            file_name: "catalog.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1, 2, 3],
        };
        let err = validate(&file).unwrap_err();
        assert!(err.contains("Unsupported file type"));
    }

    #[test]
    fn validate_rejects_oversized_file() {
        let file = LocalFile {
            file_name: "huge.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0; MAX_FILE_SIZE + 1],
        };
        let err = validate(&file).unwrap_err();
        assert!(err.contains("too large"));
    }

    #[test]
    fn compress_downscales_to_bounds() {
        let file = png_file(3200, 1600);
        let out = compress(&file, &CompressOptions::default());
        assert_eq!(out.content_type, "image/jpeg");

        let img = image::load_from_memory(&out.data).unwrap();
        assert_eq!(img.width(), 1600);
        assert_eq!(img.height(), 800);
    }

    #[test]
    fn compress_never_upscales() {
        let file = png_file(200, 100);
        let out = compress(&file, &CompressOptions::default());

        let img = image::load_from_memory(&out.data).unwrap();
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 100);
    }

    #[test]
    fn compress_falls_back_to_original_on_undecodable_input() {
        let file = LocalFile {
            file_name: "broken.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: b"not actually an image".to_vec(),
        };
        let out = compress(&file, &CompressOptions::default());
        assert_eq!(out.data, file.data);
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.extension, "jpg");
    }
}
