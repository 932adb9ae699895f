//! # OCR Instance Manager Module
//!
//! Caches Tesseract instances per language string so each photo does not pay
//! the engine initialization cost again.

use leptess::LepTess;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;

/// Thread-safe pool of Tesseract instances keyed by language configuration
///
/// Instances are created on first request for a language string and reused
/// for the life of the manager. A handle is an `Arc<Mutex<LepTess>>`: only one
/// recognition runs on a given instance at a time.
///
/// # Thread Safety
///
/// The map sits behind a `Mutex` and a poisoned lock is recovered, so a
/// panicking OCR task does not disable the cache for everyone else.
pub struct OcrInstanceManager {
    instances: Mutex<HashMap<String, Arc<Mutex<LepTess>>>>,
}

impl OcrInstanceManager {
    /// Create an empty instance pool
    ///
    /// # Examples
    ///
    /// ```rust
    /// use task_snap_bot::instance_manager::OcrInstanceManager;
    ///
    /// let manager = OcrInstanceManager::new();
    /// ```
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create an OCR instance for the configured languages
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use task_snap_bot::instance_manager::OcrInstanceManager;
    /// use task_snap_bot::ocr_config::OcrConfig;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = OcrInstanceManager::new();
    /// let instance = manager.get_instance(&OcrConfig::default())?;
    /// let text = instance.lock().unwrap().get_utf8_text()?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Initialization`] when Tesseract cannot load the
    /// language data (e.g. `tesseract-ocr-ukr` is not installed).
    pub fn get_instance(&self, config: &OcrConfig) -> Result<Arc<Mutex<LepTess>>, OcrError> {
        let key = config.languages.clone();

        {
            let instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(instance) = instances.get(&key) {
                return Ok(Arc::clone(instance));
            }
        }

        info!(languages = %key, "Creating new OCR instance");
        let tess = LepTess::new(None, &key).map_err(|e| {
            OcrError::Initialization(format!("Failed to initialize Tesseract for '{key}': {e}"))
        })?;

        let instance = Arc::new(Mutex::new(tess));
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        // Another task may have raced us; keep whichever landed first.
        let stored = instances.entry(key).or_insert_with(|| Arc::clone(&instance));
        Ok(Arc::clone(stored))
    }
}

impl Default for OcrInstanceManager {
    fn default() -> Self {
        Self::new()
    }
}
