//! # Task Snap Bot
//!
//! A Telegram bot that reads a task from a photo with OCR, produces an
//! answer, and links to a small web page showing the task and its solution.

pub mod bot;
pub mod config;
pub mod errors;
pub mod instance_manager;
pub mod localization;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod solver;
pub mod store;
pub mod subscription;
pub mod web;
