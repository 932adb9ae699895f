//! # OCR Module
//!
//! Turns raw photo bytes into text: format check, decode, grayscale,
//! sharpen, contrast boost, then Tesseract with a single fixed language.

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, ImageOutputFormat, Luma};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, PoisonError};
use tracing::{debug, info, warn};

use crate::instance_manager::OcrInstanceManager;
use crate::ocr_config::{OcrConfig, SHARPEN_KERNEL};
use crate::ocr_errors::OcrError;

/// Source of recognized text for a downloaded photo
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Recognize the text on the image stored at `image_path`
    ///
    /// Whitespace-only output is a success; callers decide what "no text"
    /// means for them.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Validation`] for files that are not a supported
    /// image, and the other [`OcrError`] variants when reading, decoding or
    /// recognition fails.
    async fn extract_text(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// Tesseract-backed extractor running the full preprocessing pipeline
pub struct TesseractExtractor {
    config: OcrConfig,
    instances: Arc<OcrInstanceManager>,
}

impl TesseractExtractor {
    /// Build an extractor sharing the given instance pool
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use std::sync::Arc;
    /// use task_snap_bot::instance_manager::OcrInstanceManager;
    /// use task_snap_bot::ocr::{TesseractExtractor, TextExtractor};
    /// use task_snap_bot::ocr_config::OcrConfig;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let extractor =
    ///     TesseractExtractor::new(OcrConfig::default(), Arc::new(OcrInstanceManager::new()));
    /// let text = extractor.extract_text(Path::new("task.jpg")).await?;
    /// println!("{text}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: OcrConfig, instances: Arc<OcrInstanceManager>) -> Self {
        Self { config, instances }
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, image_path: &Path) -> Result<String, OcrError> {
        let path = image_path.to_path_buf();
        let config = self.config.clone();
        let instances = Arc::clone(&self.instances);

        // Decoding and recognition are CPU bound; keep them off the async workers.
        tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&path)
                .map_err(|e| OcrError::ImageLoad(format!("Cannot read {}: {e}", path.display())))?;
            let processed = preprocess_image(&bytes, &config)?;
            recognize_text(&processed, &config, &instances)
        })
        .await
        .map_err(|e| OcrError::Extraction(format!("OCR task aborted: {e}")))?
    }
}

/// Detect the image format from magic bytes and check it is one we can decode
///
/// Only the first `config.buffer_size` bytes are inspected. PNG, JPEG, BMP,
/// TIFF and WebP are accepted.
///
/// # Examples
///
/// ```rust
/// use image::ImageFormat;
/// use task_snap_bot::ocr::detect_image_format;
/// use task_snap_bot::ocr_config::OcrConfig;
///
/// let png_header = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
/// let format = detect_image_format(png_header, &OcrConfig::default()).unwrap();
/// assert_eq!(format, ImageFormat::Png);
/// ```
///
/// # Errors
///
/// Returns [`OcrError::Validation`] when the data is shorter than
/// `min_format_bytes`, larger than `max_file_size`, or not a supported format.
pub fn detect_image_format(bytes: &[u8], config: &OcrConfig) -> Result<ImageFormat, OcrError> {
    if bytes.len() < config.min_format_bytes {
        return Err(OcrError::Validation(format!(
            "image too small to identify ({} bytes, need at least {})",
            bytes.len(),
            config.min_format_bytes
        )));
    }

    if bytes.len() as u64 > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "image is {} bytes, limit is {}",
            bytes.len(),
            config.max_file_size
        )));
    }

    let head = &bytes[..bytes.len().min(config.buffer_size)];
    let format = image::guess_format(head)
        .map_err(|e| OcrError::Validation(format!("unknown image format: {e}")))?;

    match format {
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::WebP => {
            debug!(format = ?format, "Detected supported image format");
            Ok(format)
        }
        other => Err(OcrError::Validation(format!(
            "unsupported image format: {other:?}"
        ))),
    }
}

/// Shorthand for [`detect_image_format`] when the format itself is not needed
pub fn is_supported_image_format(bytes: &[u8], config: &OcrConfig) -> bool {
    detect_image_format(bytes, config).is_ok()
}

/// Decode and normalize an image for recognition
///
/// Grayscale, then [`sharpen`], then [`enhance_contrast`] with
/// `config.contrast_factor`. The output keeps the source dimensions.
///
/// # Errors
///
/// Returns [`OcrError::Validation`] from the format check and
/// [`OcrError::ImageLoad`] when the bytes do not decode.
pub fn preprocess_image(bytes: &[u8], config: &OcrConfig) -> Result<GrayImage, OcrError> {
    let format = detect_image_format(bytes, config)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "Decoded image for OCR"
    );

    let gray = decoded.to_luma8();
    let sharpened = sharpen(&gray);
    Ok(enhance_contrast(&sharpened, config.contrast_factor))
}

/// Apply the sharpen kernel; border pixels keep their source value
pub fn sharpen(image: &GrayImage) -> GrayImage {
    let mut out: GrayImage = image::imageops::filter3x3(image, &SHARPEN_KERNEL);
    let (width, height) = image.dimensions();

    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                out.put_pixel(x, y, *image.get_pixel(x, y));
            }
        }
    }

    out
}

/// Scale each pixel's distance from the mean intensity by `factor`
///
/// The mean is rounded to the nearest integer and results are clamped to
/// `0..=255`.
///
/// # Examples
///
/// ```rust
/// use image::GrayImage;
/// use task_snap_bot::ocr::enhance_contrast;
///
/// let image = GrayImage::from_raw(2, 1, vec![100, 200]).unwrap();
/// assert_eq!(enhance_contrast(&image, 2.0).as_raw(), &vec![50, 250]);
/// ```
pub fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return image.clone();
    }

    let total: u64 = image.pixels().map(|p| u64::from(p.0[0])).sum();
    let mean = (total as f64 / pixel_count as f64 + 0.5).floor() as f32;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = mean + factor * (f32::from(pixel.0[0]) - mean);
        *pixel = Luma([value.clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Run Tesseract over an already preprocessed image
///
/// The image is re-encoded as PNG and handed to the cached instance for
/// `config.languages`; the instance is locked for the whole recognition.
///
/// # Errors
///
/// Returns [`OcrError::Initialization`] when no instance can be created,
/// [`OcrError::ImageLoad`] when Tesseract rejects the image, and
/// [`OcrError::Extraction`] when the recognized text cannot be read.
pub fn recognize_text(
    image: &GrayImage,
    config: &OcrConfig,
    instances: &OcrInstanceManager,
) -> Result<String, OcrError> {
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;

    let instance = instances.get_instance(config)?;
    let mut tess = instance.lock().unwrap_or_else(PoisonError::into_inner);

    tess.set_image_from_mem(&png)
        .map_err(|e| OcrError::ImageLoad(format!("Tesseract rejected image: {e}")))?;
    let text = tess
        .get_utf8_text()
        .map_err(|e| OcrError::Extraction(format!("Failed to read recognized text: {e}")))?;

    if text.trim().is_empty() {
        warn!("OCR finished without recognizable text");
    } else {
        info!(chars_extracted = text.chars().count(), "OCR extraction completed");
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(image: &GrayImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    #[test]
    fn test_contrast_doubles_distance_from_mean() {
        let image = GrayImage::from_raw(2, 1, vec![100, 200]).unwrap();
        let out = enhance_contrast(&image, 2.0);
        assert_eq!(out.as_raw(), &vec![50, 250]);
    }

    #[test]
    fn test_contrast_clamps_to_byte_range() {
        let image = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let out = enhance_contrast(&image, 4.0);
        assert_eq!(out.as_raw(), &vec![0, 255]);
    }

    #[test]
    fn test_sharpen_keeps_uniform_image_unchanged() {
        let image = GrayImage::from_pixel(5, 4, Luma([120]));
        let out = sharpen(&image);
        assert!(out.pixels().all(|p| p.0[0] == 120));
    }

    #[test]
    fn test_sharpen_boosts_isolated_bright_pixel() {
        let mut image = GrayImage::from_pixel(3, 3, Luma([10]));
        image.put_pixel(1, 1, Luma([100]));
        let out = sharpen(&image);
        // (32 * 100 - 16 * 10) / 16 = 190
        assert_eq!(out.get_pixel(1, 1).0[0], 190);
        assert_eq!(out.get_pixel(0, 0).0[0], 10);
    }

    #[test]
    fn test_png_is_supported() {
        let image = GrayImage::from_pixel(4, 4, Luma([0]));
        let bytes = encode(&image, ImageOutputFormat::Png);
        assert_eq!(
            detect_image_format(&bytes, &OcrConfig::default()).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let bytes = b"definitely not an image at all".to_vec();
        assert!(!is_supported_image_format(&bytes, &OcrConfig::default()));
    }

    #[test]
    fn test_too_short_input_is_rejected() {
        let err = detect_image_format(&[0x89, 0x50], &OcrConfig::default()).unwrap_err();
        assert!(matches!(err, OcrError::Validation(_)));
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let image = GrayImage::from_pixel(16, 16, Luma([0]));
        let bytes = encode(&image, ImageOutputFormat::Png);
        let config = OcrConfig {
            max_file_size: 10,
            ..OcrConfig::default()
        };
        let err = detect_image_format(&bytes, &config).unwrap_err();
        assert!(matches!(err, OcrError::Validation(_)));
    }

    #[test]
    fn test_preprocess_outputs_grayscale_of_same_size() {
        let rgb = image::RgbImage::from_pixel(6, 3, image::Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();

        let processed = preprocess_image(&bytes, &OcrConfig::default()).unwrap();
        assert_eq!(processed.dimensions(), (6, 3));
    }
}
