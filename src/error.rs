//! Error types for upiqr operations

use thiserror::Error;

/// Result type alias using upiqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for upiqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required payment field is missing or empty
    #[error("{field} is required: {message}")]
    Validation {
        /// Name of the offending field as shown on the form
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// Amount text is not a non-negative number (strict mode only)
    #[error("Invalid amount '{0}': expected a non-negative number")]
    AmountFormat(String),

    /// Text is not a `upi://pay` link
    #[error("Invalid UPI link: {0}")]
    InvalidLink(String),

    /// Clipboard write rejected by the platform
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Export requested before any link was created
    #[error("No payment link has been created yet")]
    NothingGenerated,

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error is a form validation failure that should be shown inline.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::AmountFormat(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
