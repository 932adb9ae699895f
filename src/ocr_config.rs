//! # OCR Configuration Module
//!
//! Fixed parameters of the preprocessing pipeline and the OCR language.

// Constants for OCR configuration
pub const DEFAULT_LANGUAGES: &str = "ukr";
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for image files
pub const CONTRAST_FACTOR: f32 = 2.0;

/// 3x3 sharpen kernel, normalized by its sum (16) when applied
pub const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Configuration structure for OCR processing
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language code, always [`DEFAULT_LANGUAGES`] in the bot
    pub languages: String,
    /// Buffer size for format detection in bytes
    pub buffer_size: usize,
    /// Minimum bytes required for format detection
    pub min_format_bytes: usize,
    /// Maximum allowed image size in bytes
    pub max_file_size: u64,
    /// Multiplier applied around the mean intensity
    pub contrast_factor: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            buffer_size: FORMAT_DETECTION_BUFFER_SIZE,
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            contrast_factor: CONTRAST_FACTOR,
        }
    }
}
