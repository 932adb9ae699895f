//! # Bot Error Module
//!
//! Every failure the bot can hit is a [`BotError`]. Each error maps to an
//! [`ErrorKind`], and each kind maps to a fixed [`ErrorPolicy`] that decides
//! whether the error is logged, shown to the user, or stops the process.

use crate::ocr_errors::OcrError;

/// Coarse classification used to pick a handling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed startup configuration
    Configuration,
    /// Telegram API, file download, OCR engine or solver backend failed
    ExternalService,
    /// Input rejected before processing (format, size)
    Validation,
}

/// What to do with an error of a given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub log: bool,
    pub notify_user: bool,
    pub fatal: bool,
}

impl ErrorKind {
    pub fn policy(self) -> ErrorPolicy {
        match self {
            ErrorKind::Configuration => ErrorPolicy {
                log: true,
                notify_user: false,
                fatal: true,
            },
            ErrorKind::ExternalService => ErrorPolicy {
                log: true,
                notify_user: true,
                fatal: false,
            },
            ErrorKind::Validation => ErrorPolicy {
                log: true,
                notify_user: true,
                fatal: false,
            },
        }
    }

    /// Localization key of the message sent to the user, if any
    pub fn user_message_key(self) -> Option<&'static str> {
        match self {
            ErrorKind::Configuration => None,
            ErrorKind::ExternalService => Some("processing-error"),
            ErrorKind::Validation => Some("unsupported-format"),
        }
    }
}

#[derive(Debug)]
pub enum BotError {
    Config(String),
    Telegram(String),
    Download(String),
    Ocr(OcrError),
    Solver(String),
}

impl BotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BotError::Config(_) => ErrorKind::Configuration,
            BotError::Ocr(OcrError::Validation(_)) => ErrorKind::Validation,
            BotError::Telegram(_)
            | BotError::Download(_)
            | BotError::Ocr(_)
            | BotError::Solver(_) => ErrorKind::ExternalService,
        }
    }
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BotError::Telegram(msg) => write!(f, "Telegram API error: {msg}"),
            BotError::Download(msg) => write!(f, "Download error: {msg}"),
            BotError::Ocr(err) => write!(f, "OCR error: {err}"),
            BotError::Solver(msg) => write!(f, "Solver error: {msg}"),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::Ocr(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OcrError> for BotError {
    fn from(err: OcrError) -> Self {
        BotError::Ocr(err)
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::Telegram(err.to_string())
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::Download(err.to_string())
    }
}
