//! Channel membership check used to gate photo processing.

use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, Recipient};
use tracing::{debug, error};

/// Turn the configured channel string into a Bot API recipient
pub fn channel_recipient(channel: &str) -> Recipient {
    let channel = channel.trim();
    match channel.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if channel.starts_with('@') => Recipient::ChannelUsername(channel.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{channel}")),
    }
}

pub fn status_grants_access(status: ChatMemberStatus) -> bool {
    matches!(
        status,
        ChatMemberStatus::Owner | ChatMemberStatus::Administrator | ChatMemberStatus::Member
    )
}

/// Whether `user_id` is currently a member, admin or owner of `channel`.
///
/// Lookup failures are logged and reported as "not subscribed".
pub async fn is_subscribed(bot: &Bot, channel: &str, user_id: UserId) -> bool {
    match bot.get_chat_member(channel_recipient(channel), user_id).await {
        Ok(member) => {
            let status = member.kind.status();
            debug!(user_id = %user_id, status = ?status, "Fetched channel membership");
            status_grants_access(status)
        }
        Err(e) => {
            error!(user_id = %user_id, channel = %channel, error = %e, "Subscription check failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_channel_becomes_chat_id() {
        assert_eq!(
            channel_recipient("-1001234567890"),
            Recipient::Id(ChatId(-1001234567890))
        );
    }

    #[test]
    fn test_username_gets_at_prefix() {
        assert_eq!(
            channel_recipient("my_channel"),
            Recipient::ChannelUsername("@my_channel".to_string())
        );
        assert_eq!(
            channel_recipient(" @my_channel "),
            Recipient::ChannelUsername("@my_channel".to_string())
        );
    }

    #[test]
    fn test_only_present_members_have_access() {
        assert!(status_grants_access(ChatMemberStatus::Owner));
        assert!(status_grants_access(ChatMemberStatus::Administrator));
        assert!(status_grants_access(ChatMemberStatus::Member));
        assert!(!status_grants_access(ChatMemberStatus::Restricted));
        assert!(!status_grants_access(ChatMemberStatus::Left));
        assert!(!status_grants_access(ChatMemberStatus::Banned));
    }
}
