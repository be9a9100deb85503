//! Error types for postprep operations.
//!
//! This module defines the main error type [`PostprepError`] which represents
//! all possible errors that can occur during page fetching, content extraction,
//! caption generation, publishing, and account storage.
//!
//! # Example
//!
//! ```rust
//! use postprep_core::{PostprepError, Result};
//!
//! fn require_image(image_url: &str) -> Result<()> {
//!     if image_url.is_empty() {
//!         return Err(PostprepError::MissingField("imageUrl"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for postprep operations.
///
/// Extraction itself has a single fatal case: an unusable base URL. Every
/// other irregularity inside a document degrades into a smaller but valid
/// result instead of an error. The remaining variants cover the outbound
/// collaborators (page fetch, caption provider, Instagram Graph API) and the
/// account store.
#[derive(Error, Debug)]
pub enum PostprepError {
    /// Invalid URL provided.
    ///
    /// Returned when the caller-supplied base URL cannot be parsed as an
    /// absolute URL. Malformed URL candidates *inside* a page are skipped
    /// silently and never produce this error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and other
    /// transport-level problems.
    #[cfg(any(feature = "fetch", feature = "clients"))]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The page fetch came back with a non-success status.
    ///
    /// Fetch failures are signaled to the caller before extraction runs;
    /// the extractor never sees a failed response.
    #[error("Fetching {url} returned HTTP {status}")]
    FetchStatus { status: u16, url: String },

    /// A required request field was missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The caption provider returned an error payload.
    #[error("Caption provider error: {0}")]
    CaptionApi(String),

    /// The caption provider answered, but with unusable output.
    ///
    /// Raised when the response has no message content or the generated
    /// caption is too short to post.
    #[error("Generated caption rejected: {0}")]
    CaptionRejected(String),

    /// Exchanging an OAuth code for an access token failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// The Graph API refused to create the media container.
    #[error("Media container creation failed: {0}")]
    MediaCreate(String),

    /// The Graph API refused to publish the created container.
    #[error("Media publish failed: {0}")]
    MediaPublish(String),

    /// No stored account connection for the requested user.
    #[error("No Instagram connection for user {0}")]
    AccountNotFound(String),

    /// Account store errors.
    ///
    /// Covers malformed record identifiers and corrupt store contents.
    #[error("Account store error: {0}")]
    Store(String),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for PostprepError.
///
/// This is a convenience alias for `std::result::Result<T, PostprepError>`.
pub type Result<T> = std::result::Result<T, PostprepError>;
