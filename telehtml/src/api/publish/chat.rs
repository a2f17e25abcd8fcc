use std::fmt;

use teloxide::types::{ChatId, MessageId, Recipient};

use super::error::PublishError;

const LINK_PREFIXES: [&str; 4] = ["https://t.me/", "http://t.me/", "t.me/", "https://telegram.me/"];

/// Chat address in the form Telegram expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    /// Public chat or channel, stored with the leading `@`
    Username(String),
    Id(i64),
}

impl ChatTarget {
    /// Normalizes a user supplied chat identifier.
    ///
    /// * `@name` is kept, `name` becomes `@name`, `t.me/name` links become `@name`
    /// * private `t.me/c/<id>/...` links become the `-100<id>` chat id
    /// * negative numbers are kept as they are
    /// * positive numbers are channel ids without the `-100` prefix, which is added
    pub fn parse(raw: &str) -> Result<Self, PublishError> {
        let trimmed = raw.trim();
        let invalid = || PublishError::InvalidChatId(raw.to_string());

        let trimmed = match LINK_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
        {
            Some(path) => {
                let path = path.split(['?', '#']).next().unwrap_or_default();
                let mut segments = path.split('/');
                match segments.next() {
                    // t.me/c/<internal id>/<message id> addresses a chat without a username
                    Some("c") => {
                        let internal = segments.next().unwrap_or_default();
                        if internal.is_empty() || !internal.bytes().all(|b| b.is_ascii_digit()) {
                            return Err(invalid());
                        }
                        internal
                    }
                    first => first.unwrap_or_default(),
                }
            }
            None => trimmed,
        };

        if trimmed.is_empty() {
            return Err(invalid());
        }

        if trimmed.starts_with('-') {
            return trimmed.parse().map(ChatTarget::Id).map_err(|_| invalid());
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return format!("-100{trimmed}")
                .parse()
                .map(ChatTarget::Id)
                .map_err(|_| invalid());
        }

        let name = trimmed.strip_prefix('@').unwrap_or(trimmed);
        let is_username =
            !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if is_username {
            Ok(ChatTarget::Username(format!("@{name}")))
        } else {
            Err(invalid())
        }
    }

    pub fn recipient(&self) -> Recipient {
        match self {
            ChatTarget::Username(name) => Recipient::ChannelUsername(name.clone()),
            ChatTarget::Id(id) => Recipient::Id(ChatId(*id)),
        }
    }

    /// Username without `@`, when the chat was addressed by it
    pub fn username(&self) -> Option<&str> {
        match self {
            ChatTarget::Username(name) => Some(name.trim_start_matches('@')),
            ChatTarget::Id(_) => None,
        }
    }

    /// Public link to a message in this chat.
    ///
    /// Private chats and supergroups without a username get a `t.me/c/` link,
    /// which only works for members.
    pub fn message_url(&self, username: Option<&str>, message_id: MessageId) -> String {
        if let Some(username) = username.or_else(|| self.username()) {
            return format!("https://t.me/{}/{}", username.trim_start_matches('@'), message_id.0);
        }

        match self {
            ChatTarget::Id(id) => {
                let id = id.to_string();
                let internal = id
                    .strip_prefix("-100")
                    .or_else(|| id.strip_prefix('-'))
                    .unwrap_or(&id);
                format!("https://t.me/c/{internal}/{}", message_id.0)
            }
            // Covered by the username branch above
            ChatTarget::Username(name) => format!("https://t.me/{name}/{}", message_id.0),
        }
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Username(name) => write!(f, "{name}"),
            ChatTarget::Id(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_usernames() {
        assert_eq!(ChatTarget::parse("@news").unwrap(), ChatTarget::Username("@news".into()));
        assert_eq!(ChatTarget::parse(" news_bot ").unwrap(), ChatTarget::Username("@news_bot".into()));
        assert_eq!(
            ChatTarget::parse("https://t.me/my_channel/42").unwrap(),
            ChatTarget::Username("@my_channel".into())
        );
        assert_eq!(ChatTarget::parse("t.me/chan").unwrap(), ChatTarget::Username("@chan".into()));
    }

    #[test]
    fn test_parse_private_links() {
        assert_eq!(
            ChatTarget::parse("https://t.me/c/1234567890/42").unwrap(),
            ChatTarget::Id(-1001234567890)
        );
        assert_eq!(ChatTarget::parse("t.me/c/987").unwrap(), ChatTarget::Id(-100987));
        let chat = ChatTarget::parse("https://t.me/c/1234567890/42?single").unwrap();
        assert_eq!(chat.message_url(None, MessageId(42)), "https://t.me/c/1234567890/42");
    }

    #[test]
    fn test_parse_numeric_ids() {
        assert_eq!(ChatTarget::parse("-1001234567890").unwrap(), ChatTarget::Id(-1001234567890));
        assert_eq!(ChatTarget::parse("-42").unwrap(), ChatTarget::Id(-42));
        assert_eq!(ChatTarget::parse("1234567890").unwrap(), ChatTarget::Id(-1001234567890));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let rejected = [
            "",
            "   ",
            "@",
            "-abc",
            "hello world",
            "chan#1",
            "https://t.me/",
            "https://t.me/c/abc",
            "https://t.me/c/",
            "t.me/c/-42/1",
        ];
        for raw in rejected {
            assert!(
                matches!(ChatTarget::parse(raw), Err(PublishError::InvalidChatId(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_recipient() {
        assert_eq!(
            ChatTarget::Username("@chan".into()).recipient(),
            Recipient::ChannelUsername("@chan".into())
        );
        assert_eq!(ChatTarget::Id(-100).recipient(), Recipient::Id(ChatId(-100)));
    }

    #[test]
    fn test_message_url() {
        let chat = ChatTarget::Username("@chan".into());
        assert_eq!(chat.message_url(None, MessageId(7)), "https://t.me/chan/7");

        let chat = ChatTarget::Id(-1001234567890);
        assert_eq!(chat.message_url(None, MessageId(7)), "https://t.me/c/1234567890/7");
        assert_eq!(chat.message_url(Some("chan"), MessageId(7)), "https://t.me/chan/7");

        let chat = ChatTarget::Id(-987);
        assert_eq!(chat.message_url(None, MessageId(3)), "https://t.me/c/987/3");
    }

    #[test]
    fn test_display() {
        assert_eq!(ChatTarget::parse("1234").unwrap().to_string(), "-1001234");
        assert_eq!(ChatTarget::parse("chan").unwrap().to_string(), "@chan");
    }
}
