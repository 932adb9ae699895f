//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::prelude::*;
use tracing::debug;

use crate::localization::t;

use super::ui_builder::DISLIKE_CALLBACK;

pub fn is_dislike(q: &CallbackQuery) -> bool {
    q.data.as_deref() == Some(DISLIKE_CALLBACK)
}

/// Handle a press on the "don't like the answer" button
pub async fn callback_handler(bot: Bot, q: CallbackQuery) -> Result<()> {
    debug!(user_id = %q.from.id, "Received dislike feedback");

    let chat_id = match &q.message {
        Some(msg) => msg.chat().id,
        None => ChatId::from(q.from.id),
    };
    bot.send_message(chat_id, t("dislike-response")).await?;

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
