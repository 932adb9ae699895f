//! # OCR Error Types Module
//!
//! Structured errors for the image-to-text pipeline. Each variant carries a
//! human readable detail used in logs; users only ever see localized text.

/// Custom error types for OCR operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// Image rejected before decoding (unknown format, too large, empty)
    Validation(String),
    /// Tesseract could not be initialized for the configured language
    Initialization(String),
    /// Image bytes could not be decoded or re-encoded
    ImageLoad(String),
    /// Tesseract failed while recognizing text
    Extraction(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Initialization(msg) => write!(f, "Initialization error: {msg}"),
            OcrError::ImageLoad(msg) => write!(f, "Image load error: {msg}"),
            OcrError::Extraction(msg) => write!(f, "Extraction error: {msg}"),
        }
    }
}

impl std::error::Error for OcrError {}

impl From<image::ImageError> for OcrError {
    fn from(err: image::ImageError) -> Self {
        OcrError::ImageLoad(err.to_string())
    }
}
