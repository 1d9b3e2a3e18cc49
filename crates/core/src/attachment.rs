//! Attachment upload rules: MIME allow-list, size limit, filename hygiene,
//! and display helpers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// MIME types accepted for ticket attachments.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/avi",
    "audio/mpeg",
    "audio/wav",
    "application/pdf",
];

/// Largest accepted attachment, in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Longest filename kept after sanitizing (characters).
const MAX_FILENAME_LENGTH: usize = 200;

/// Metadata for a file the user picked, before its bytes are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Validate a file against the MIME allow-list and [`MAX_FILE_SIZE`].
pub fn validate_file(file: &FileMeta) -> Result<(), CoreError> {
    validate_file_with_limit(file, MAX_FILE_SIZE)
}

/// Same as [`validate_file`] with a caller-supplied size limit.
pub fn validate_file_with_limit(file: &FileMeta, max_size: u64) -> Result<(), CoreError> {
    if !is_allowed_mime_type(&file.mime_type) {
        return Err(CoreError::Validation(format!(
            "File type not allowed: {} ({})",
            file.name, file.mime_type
        )));
    }
    if file.size > max_size {
        return Err(CoreError::Validation(format!(
            "File too large: {} (maximum {})",
            file.name,
            format_file_size(max_size)
        )));
    }
    if file.size == 0 {
        return Err(CoreError::Validation(format!("File is empty: {}", file.name)));
    }
    Ok(())
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Drops any directory components (either separator), control characters,
/// and leading dots. Falls back to `"file"` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILENAME_LENGTH)
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `10 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}

/// Broad category of an attachment, used to pick an icon or viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Document,
}

impl AttachmentKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            AttachmentKind::Image
        } else if mime_type.starts_with("video/") {
            AttachmentKind::Video
        } else if mime_type.starts_with("audio/") {
            AttachmentKind::Audio
        } else {
            AttachmentKind::Document
        }
    }
}

/// Whether the content can be served inline (`/view`) rather than only as a
/// download.
pub fn is_inline_viewable(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}
