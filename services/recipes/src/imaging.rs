//! Image normalization for recipe uploads
//!
//! Uploads are decoded, shrunk to fit 1024x768, flattened to RGB and written
//! back as JPEG under the uploads directory.

use image::{GenericImageView, codecs::jpeg::JpegEncoder, imageops::FilterType};
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Largest stored width in pixels
pub const MAX_WIDTH: u32 = 1024;

/// Largest stored height in pixels
pub const MAX_HEIGHT: u32 = 768;

/// URL path prefix under which uploads are served
pub const PUBLIC_PREFIX: &str = "static/uploads";

/// An uploaded file as received from the form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Browsers send an empty file part when nothing was chosen
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode, bound and re-encode an image as JPEG
///
/// Images already within 1024x768 keep their size. Any alpha channel is
/// dropped since JPEG cannot carry it.
pub fn normalize(bytes: &[u8]) -> AppResult<Vec<u8>> {
    let img =
        image::load_from_memory(bytes).map_err(|e| AppError::ImageDecode(e.to_string()))?;

    let (width, height) = img.dimensions();
    let img = if width > MAX_WIDTH || height > MAX_HEIGHT {
        img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new(&mut out)
        .encode_image(&rgb)
        .map_err(|e| AppError::Internal(format!("Failed to encode JPEG: {}", e)))?;

    Ok(out)
}

/// Derive a collision-free file name that cannot leave the uploads directory
///
/// The client's name only contributes a sanitized stem; directories and the
/// original extension are discarded.
pub fn safe_file_name(original: &str) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let regex = UNSAFE_CHARS
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("Failed to compile file name regex"));

    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let cleaned = regex.replace_all(stem, "_");
    let cleaned: String = cleaned.trim_matches('_').chars().take(64).collect();
    let cleaned = if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    };

    format!("{}_{}.jpg", Uuid::new_v4().simple(), cleaned)
}

/// Writes normalized uploads into a fixed directory
#[derive(Clone)]
pub struct ImageNormalizer {
    upload_dir: PathBuf,
}

impl ImageNormalizer {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Create the uploads directory if needed
    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))
    }

    /// Normalize an upload and write it, returning its relative path
    pub async fn store(&self, upload: ImageUpload) -> AppResult<String> {
        info!(
            "Normalizing uploaded image: {} ({} bytes)",
            upload.file_name,
            upload.bytes.len()
        );

        let ImageUpload { file_name, bytes } = upload;
        let jpeg = tokio::task::spawn_blocking(move || normalize(&bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Image task failed: {}", e)))??;

        let stored_name = safe_file_name(&file_name);
        self.ensure_dir().await?;
        tokio::fs::write(self.upload_dir.join(&stored_name), &jpeg)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write image: {}", e)))?;

        info!("Stored image as {}", stored_name);
        Ok(format!("{}/{}", PUBLIC_PREFIX, stored_name))
    }

    /// Delete a stored image by the path returned from [`store`](Self::store)
    ///
    /// Only the final path component is used, so nothing outside the
    /// uploads directory can be removed. Failures are logged and swallowed.
    pub async fn remove(&self, public_path: &str) {
        let Some(file_name) = Path::new(public_path).file_name() else {
            warn!("Ignoring image path without a file name: {}", public_path);
            return;
        };

        let path = self.upload_dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!("Removed image {}", path.display()),
            Err(e) => warn!("Failed to remove image {}: {}", path.display(), e),
        }
    }
}
