//! Image upload rules: accepted MIME types, size limit, stored file naming,
//! and safe resolution of client-supplied image paths.

use rand::Rng;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximum upload size (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "image";

/// Prefix of image paths that point into the managed uploads directory.
///
/// Uploaded files are reported to clients as `./images/<filename>`, and only
/// images under this prefix are ever deleted on the server.
pub const MANAGED_IMAGE_PREFIX: &str = "./images/";

/// Extensions (without the dot, lowercase) carried over from the original
/// name. Stored files are served statically, so the extension decides the
/// `Content-Type` they are served with.
const IMAGE_EXTENSIONS: &[&str] = &[
    "avif", "bmp", "gif", "ico", "jpeg", "jpg", "png", "tif", "tiff", "webp",
];

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why an upload was refused. Every variant maps to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Only image files are allowed (got '{0}')")]
    NotAnImage(String),

    #[error("File too large. Maximum size is {} MB", .max / (1024 * 1024))]
    TooLarge { size: usize, max: usize },
}

/// Accept only `image/*` content types.
pub fn validate_image_mime(content_type: Option<&str>) -> Result<(), UploadRejection> {
    match content_type {
        Some(mime) if mime.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        Some(mime) => Err(UploadRejection::NotAnImage(mime.to_string())),
        None => Err(UploadRejection::NotAnImage("unknown".into())),
    }
}

/// Reject payloads larger than `max` bytes.
pub fn validate_upload_size(size: usize, max: usize) -> Result<(), UploadRejection> {
    if size > max {
        Err(UploadRejection::TooLarge { size, max })
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Extension of `original_name` including the leading dot, or `""`.
///
/// Only known raster image extensions survive (compared case-insensitively,
/// kept in the client's case). Anything else is dropped, so an `image/*`
/// upload named `x.html` is not later served as a page.
pub fn extension_of(original_name: &str) -> String {
    let base = basename(original_name);
    match base.rfind('.') {
        Some(0) | None => String::new(),
        Some(pos) => {
            let ext = &base[pos + 1..];
            if IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)) {
                base[pos..].to_string()
            } else {
                String::new()
            }
        }
    }
}

/// Stored filename: `<unix-millis>-<suffix><ext>`.
pub fn stored_filename(original_name: &str, unix_millis: i64, suffix: u32) -> String {
    format!("{unix_millis}-{suffix}{}", extension_of(original_name))
}

/// Stored filename with the current time and a random suffix below 10^9.
pub fn generate_filename(original_name: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    stored_filename(
        original_name,
        chrono::Utc::now().timestamp_millis(),
        suffix,
    )
}

/// Client-facing path of a stored upload.
pub fn public_path(filename: &str) -> String {
    format!("{MANAGED_IMAGE_PREFIX}{filename}")
}

/// Whether `image` points at a file in the managed uploads directory.
pub fn is_managed_image(image: &str) -> bool {
    image.starts_with(MANAGED_IMAGE_PREFIX)
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Reduce a client-supplied image path to a bare filename inside the uploads
/// directory.
///
/// Only the final path component is kept (both `/` and `\` separate), so
/// `./images/a.jpg`, `a.jpg` and `../../etc/a.jpg` all resolve to `a.jpg`.
/// Empty names, `.` and `..` are rejected.
pub fn resolve_image_filename(requested: &str) -> Result<String, CoreError> {
    let name = basename(requested.trim());
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(CoreError::Validation(format!(
            "Invalid image path '{requested}'"
        )));
    }
    Ok(name.to_string())
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
