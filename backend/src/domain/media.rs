//! Media uploads and the object keys they are stored under.
//!
//! Keys take the form `{folder}/{upload_ms}-{sanitised_filename}`.

/// Folder used when the caller does not name one.
pub const DEFAULT_FOLDER: &str = "uploads";
/// Filename used when the caller's filename sanitises to nothing.
pub const DEFAULT_FILENAME: &str = "uploaded_file.dat";
/// Content type used when the client sent none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Folder for course cover images.
pub const COURSE_IMAGES: &str = "course_images";
/// Folder for component images.
pub const COMPONENT_IMAGES: &str = "component_images";
/// Folder for product images.
pub const PRODUCT_IMAGES: &str = "product_images";
/// Folder for project images.
pub const PROJECT_IMAGES: &str = "project_images";

/// A file received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// File contents; an empty upload is rejected.
    pub bytes: Vec<u8>,
    /// Client-supplied name, sanitised into the object key.
    pub filename: Option<String>,
    /// Declared MIME type.
    pub content_type: Option<String>,
}

impl MediaUpload {
    /// Content type to store, falling back to [`DEFAULT_CONTENT_TYPE`].
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Collapse whitespace runs to `_` and drop path components.
///
/// # Examples
/// ```
/// use courseware::domain::sanitise_filename;
///
/// assert_eq!(sanitise_filename("my  cover photo.png"), "my_cover_photo.png");
/// assert_eq!(sanitise_filename("../../etc/passwd"), "passwd");
/// ```
#[must_use]
pub fn sanitise_filename(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches('.');
    let mut out = String::with_capacity(base.len());
    let mut in_space = false;
    for ch in base.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else if !ch.is_control() {
            out.push(ch);
            in_space = false;
        }
    }
    if out.is_empty() {
        DEFAULT_FILENAME.to_owned()
    } else {
        out
    }
}

/// Normalise a folder: trim slashes and whitespace, drop `.`/`..` segments.
#[must_use]
pub fn normalise_folder(raw: Option<&str>) -> String {
    let cleaned = raw
        .unwrap_or_default()
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/");
    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_owned()
    } else {
        cleaned
    }
}

/// Build the storage key for an upload made at `upload_ms`.
#[must_use]
pub fn object_key(folder: Option<&str>, filename: Option<&str>, upload_ms: i64) -> String {
    format!(
        "{}/{}-{}",
        normalise_folder(folder),
        upload_ms,
        sanitise_filename(filename.unwrap_or_default())
    )
}
