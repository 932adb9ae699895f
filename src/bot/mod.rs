//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: `/start`, photos and everything else
//! - `callback_handler`: the "dislike" feedback button
//! - `ui_builder`: inline keyboards

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::config::Config;
use crate::ocr::TextExtractor;
use crate::solver::Solver;
use crate::store::ResultStore;

pub use callback_handler::callback_handler;
pub use message_handler::{
    message_handler, process_submission, reply_for, send_failure_notice, Reply, SubmissionOutcome,
};
pub use ui_builder::{create_result_keyboard, DISLIKE_CALLBACK};

/// Everything the handlers need, injected into the dispatcher once
pub struct BotState {
    pub config: Arc<Config>,
    pub store: Arc<ResultStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub solver: Arc<dyn Solver>,
}

/// Build the update handler tree
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(
            Update::filter_callback_query()
                .filter(|q: CallbackQuery| callback_handler::is_dislike(&q))
                .endpoint(callback_handler),
        )
}
