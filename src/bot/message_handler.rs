//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{FileId, InlineKeyboardMarkup};
use teloxide::RequestError;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::errors::{BotError, ErrorKind};
use crate::localization::{t, t_args};
use crate::store::SolutionRecord;
use crate::subscription::is_subscribed;

use super::ui_builder::create_result_keyboard;
use super::BotState;

/// Result of running one photo through OCR and the solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// OCR returned nothing but whitespace; nothing was stored
    NoText,
    /// Solution produced and stored for the user
    Solved(SolutionRecord),
}

/// Download a Telegram file into a temporary file
///
/// The file is deleted when the returned handle is dropped.
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<NamedTempFile, BotError> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    // The URL embeds the bot token, keep it out of error messages.
    let response = reqwest::get(&url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| BotError::Download(e.without_url().to_string()))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BotError::Download(e.without_url().to_string()))?;

    let mut temp_file = tempfile::Builder::new()
        .prefix("task-photo-")
        .suffix(".jpg")
        .tempfile()?;
    temp_file.as_file_mut().write_all(&bytes)?;
    debug!(temp_path = %temp_file.path().display(), size = bytes.len(), "Photo downloaded");

    Ok(temp_file)
}

/// Recognize the task on a downloaded photo, solve it and store the result
pub async fn process_submission(
    state: &BotState,
    user_id: u64,
    image_path: &Path,
) -> Result<SubmissionOutcome, BotError> {
    let text = state.extractor.extract_text(image_path).await?;

    if text.trim().is_empty() {
        warn!(user_id, "OCR extraction returned empty text");
        return Ok(SubmissionOutcome::NoText);
    }

    let solution = state.solver.solve(&text).await?;
    let record = state.store.put(user_id, text, solution).await;
    info!(user_id, task_chars = record.task.chars().count(), "Solution stored");

    Ok(SubmissionOutcome::Solved(record))
}

/// Log an error per its policy and return the text to show the user, if any
pub fn report_error(user_id: u64, err: &BotError) -> Option<String> {
    let kind = err.kind();
    let policy = kind.policy();

    if policy.log {
        match kind {
            ErrorKind::Validation => warn!(user_id, error = %err, "Rejected photo"),
            _ => error!(user_id, error = %err, kind = ?kind, "Photo processing failed"),
        }
    }

    if policy.notify_user {
        kind.user_message_key().map(t)
    } else {
        None
    }
}

/// Text of a reply plus the optional inline keyboard under it
pub type Reply = (String, Option<InlineKeyboardMarkup>);

/// Pick the reply for a processed photo
///
/// A solved task gets `answer-ready` with the result keyboard, a blank page
/// gets `no-text-found`, and failures go through [`report_error`]. `None`
/// means the user is not told anything.
pub fn reply_for(
    outcome: &Result<SubmissionOutcome, BotError>,
    config: &Config,
    user_id: u64,
) -> Option<Reply> {
    match outcome {
        Ok(SubmissionOutcome::Solved(_)) => {
            match create_result_keyboard(&config.result_url(user_id)) {
                Ok(keyboard) => Some((t("answer-ready"), Some(keyboard))),
                Err(e) => report_error(user_id, &e).map(|notice| (notice, None)),
            }
        }
        Ok(SubmissionOutcome::NoText) => Some((t("no-text-found"), None)),
        Err(e) => report_error(user_id, e).map(|notice| (notice, None)),
    }
}

/// Notice to send after Telegram refused a reply
pub fn send_failure_notice(user_id: u64, err: RequestError) -> Option<String> {
    report_error(user_id, &BotError::from(err))
}

/// Send a reply; if Telegram rejects it, fall back to the error notice
async fn deliver(bot: &Bot, chat_id: ChatId, user_id: u64, reply: Reply) {
    let (text, keyboard) = reply;
    let mut request = bot.send_message(chat_id, text);
    if let Some(keyboard) = keyboard {
        request = request.reply_markup(keyboard);
    }

    let Err(e) = request.await else {
        return;
    };
    if let Some(notice) = send_failure_notice(user_id, e) {
        if let Err(e) = bot.send_message(chat_id, notice).await {
            error!(user_id, error = %e, "Could not deliver error notice");
        }
    }
}

async fn handle_start(bot: &Bot, msg: &Message) -> Result<()> {
    debug!(chat_id = %msg.chat.id, "Received /start");
    bot.send_message(msg.chat.id, t("welcome")).await?;
    Ok(())
}

async fn handle_photo_message(bot: &Bot, msg: &Message, state: &BotState) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Photo without sender, ignoring");
        return Ok(());
    };
    let user_id = user.id;
    debug!(user_id = %user_id, "Received photo message from user");

    if state.config.require_subscription
        && !is_subscribed(bot, &state.config.channel, user_id).await
    {
        info!(user_id = %user_id, "User is not subscribed to the channel");
        let notice = t_args("not-subscribed", &[("channel", &state.config.channel)]);
        deliver(bot, msg.chat.id, user_id.0, (notice, None)).await;
        return Ok(());
    }

    let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) else {
        return Ok(());
    };

    let outcome = async {
        let temp_file = download_file(bot, largest_photo.file.id.clone()).await?;
        // temp_file is removed when it drops, on success and on error alike
        process_submission(state, user_id.0, temp_file.path()).await
    }
    .await;

    if let Some(reply) = reply_for(&outcome, &state.config, user_id.0) {
        deliver(bot, msg.chat.id, user_id.0, reply).await;
    }

    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    debug!(chat_id = %msg.chat.id, "Received unsupported message type from user");
    bot.send_message(msg.chat.id, t("unsupported-message")).await?;
    Ok(())
}

pub fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(|command| command == "/start" || command.starts_with("/start@"))
        .unwrap_or(false)
}

pub async fn message_handler(bot: Bot, msg: Message, state: Arc<BotState>) -> Result<()> {
    if msg.text().is_some_and(is_start_command) {
        handle_start(&bot, &msg).await?;
    } else if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, &state).await?;
    } else {
        handle_unsupported_message(&bot, &msg).await?;
    }

    Ok(())
}
