//! UI Builder module for creating keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::errors::BotError;
use crate::localization::t;

/// Callback payload of the feedback button
pub const DISLIKE_CALLBACK: &str = "dislike";

/// Keyboard attached to a finished answer: a link to the full result page and
/// a feedback button, one per row.
pub fn create_result_keyboard(result_url: &str) -> Result<InlineKeyboardMarkup, BotError> {
    let url = reqwest::Url::parse(result_url)
        .map_err(|e| BotError::Config(format!("Invalid result link '{result_url}': {e}")))?;

    Ok(InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(t("button-expand"), url)],
        vec![InlineKeyboardButton::callback(
            t("button-dislike"),
            DISLIKE_CALLBACK,
        )],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_result_keyboard_layout() {
        let keyboard = create_result_keyboard("http://127.0.0.1:5000/result/42").unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), 2);

        let link = &keyboard.inline_keyboard[0][0];
        assert_eq!(link.text, "Розгорнути рішення");
        match &link.kind {
            InlineKeyboardButtonKind::Url(url) => {
                assert_eq!(url.as_str(), "http://127.0.0.1:5000/result/42")
            }
            other => panic!("expected url button, got {other:?}"),
        }

        let feedback = &keyboard.inline_keyboard[1][0];
        assert_eq!(feedback.text, "Не подобається відповідь");
        assert!(matches!(
            &feedback.kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == DISLIKE_CALLBACK
        ));
    }

    #[test]
    fn test_invalid_link_is_rejected() {
        assert!(create_result_keyboard("not a url").is_err());
    }
}
