use crate::store::StoreError;
use std::fmt;

/// Central error type for gallery operations.
#[derive(Debug)]
pub enum GalleryError {
    /// Cache storage error (rusqlite). Fatal: cache integrity cannot be
    /// silently degraded.
    Storage(rusqlite::Error),
    /// External media store error that must surface to the caller
    /// (delete and capture paths; listing failures fall back to the cache).
    Store(StoreError),
    /// Resource not found.
    NotFound(String),
    /// Protocol misuse (e.g. a consumed confirmation handle).
    Validation(String),
    /// Filesystem error.
    Io(std::io::Error),
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GalleryError::Storage(e) => write!(f, "Cache storage error: {}", e),
            GalleryError::Store(e) => write!(f, "Media store error: {}", e),
            GalleryError::NotFound(msg) => write!(f, "Not found: {}", msg),
            GalleryError::Validation(msg) => write!(f, "Validation error: {}", msg),
            GalleryError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for GalleryError {}

impl From<rusqlite::Error> for GalleryError {
    fn from(e: rusqlite::Error) -> Self {
        GalleryError::Storage(e)
    }
}

impl From<std::io::Error> for GalleryError {
    fn from(e: std::io::Error) -> Self {
        GalleryError::Io(e)
    }
}

impl From<StoreError> for GalleryError {
    fn from(e: StoreError) -> Self {
        GalleryError::Store(e)
    }
}

/// User-friendly error messages for UI (can be translated via i18n)
impl GalleryError {
    pub fn user_message(&self) -> String {
        match self {
            GalleryError::Storage(_) => {
                "A database error occurred. Please try again.".to_string()
            }
            GalleryError::Store(_) => {
                "The media library could not be accessed.".to_string()
            }
            GalleryError::NotFound(msg) => format!("{} was not found.", msg),
            GalleryError::Validation(msg) => msg.clone(),
            GalleryError::Io(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
        }
    }
}
