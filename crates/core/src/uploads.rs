//! Naming and validation rules for uploaded inspection photos.
//!
//! Files are stored flat in one uploads directory. The persisted path is
//! relative (`static/uploads/{file}`) and doubles as the public URL path.

use chrono::{DateTime, Utc};

use crate::error::CoreError;

/// Prefix of every persisted photo path and the URL they are served from.
pub const UPLOADS_PREFIX: &str = "static/uploads";

/// Fallback stem when sanitizing leaves nothing usable.
const DEFAULT_STEM: &str = "photo";

/// Image formats accepted as inspection photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Jpeg,
    Png,
    WebP,
}

impl PhotoFormat {
    /// Canonical file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// Sniff the image format from magic bytes.
///
/// Only the header is inspected; the image is not decoded.
pub fn detect_photo_format(bytes: &[u8]) -> Result<PhotoFormat, CoreError> {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => Ok(PhotoFormat::Jpeg),
        Ok(image::ImageFormat::Png) => Ok(PhotoFormat::Png),
        Ok(image::ImageFormat::WebP) => Ok(PhotoFormat::WebP),
        Ok(other) => Err(CoreError::Validation(format!(
            "Unsupported image format {other:?}. Supported: JPEG, PNG, WebP"
        ))),
        Err(_) => Err(CoreError::Validation(
            "Uploaded file is not a recognizable image".to_string(),
        )),
    }
}

/// Reduce a client-supplied filename to a safe ASCII name.
///
/// Directory components are dropped, whitespace becomes `_`, and anything
/// outside `[A-Za-z0-9._-]` is removed. Leading and trailing dots and
/// underscores are trimmed so the result can never be `..` or a dotfile.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Build the stored filename: `{stem}_{timestamp}.{ext}`.
///
/// The extension comes from the sniffed `format`, not the client name, so a
/// `.txt` upload that is really a JPEG is stored as `.jpg`.
pub fn timestamped_filename(original: &str, format: PhotoFormat, now: DateTime<Utc>) -> String {
    let sanitized = sanitize_filename(original);
    let stem = match sanitized.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => sanitized.as_str(),
    };
    let stem = stem.trim_matches(|c| c == '.' || c == '_');
    let stem = if stem.is_empty() { DEFAULT_STEM } else { stem };

    format!(
        "{stem}_{}.{}",
        now.format("%Y%m%d%H%M%S%6f"),
        format.extension()
    )
}

/// Persisted relative path for a stored filename.
pub fn stored_path(filename: &str) -> String {
    format!("{UPLOADS_PREFIX}/{filename}")
}

/// Recover the bare filename from a persisted path.
///
/// Returns `None` for paths outside the uploads prefix or containing
/// directory components, so callers never resolve outside the upload root.
pub fn filename_from_stored(path: &str) -> Option<&str> {
    let name = path.strip_prefix(UPLOADS_PREFIX)?.strip_prefix('/')?;
    let valid = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    valid.then_some(name)
}
