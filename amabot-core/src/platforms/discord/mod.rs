// File: amabot-core/src/platforms/discord/mod.rs

pub mod runtime;

pub use runtime::DiscordPlatform;

use twilight_model::channel::Message;
use twilight_model::id::Id;

use amabot_common::models::{InboundMessage, StoredMessage};

use crate::utils::time::from_epoch_micros;
use crate::Error;

/// Discord rejects message bodies longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Cuts `text` to at most [`MAX_MESSAGE_CHARS`] characters on a char boundary.
pub fn truncate_for_discord(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parses a snowflake id given as a decimal string.
pub fn parse_snowflake<T>(raw: &str) -> Result<Id<T>, Error> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(Id::new_checked)
        .ok_or_else(|| Error::Platform(format!("Invalid Discord id: {raw}")))
}

pub fn to_stored(msg: &Message) -> StoredMessage {
    StoredMessage {
        id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        author_id: msg.author.id.to_string(),
        content: msg.content.clone(),
        created_at: from_epoch_micros(msg.timestamp.as_micros()),
    }
}

pub fn to_inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        author_id: msg.author.id.to_string(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
        created_at: from_epoch_micros(msg.timestamp.as_micros()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twilight_model::id::marker::ChannelMarker;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_for_discord("I'm doing well!"), "I'm doing well!");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let text = "é".repeat(MAX_MESSAGE_CHARS + 10);
        let cut = truncate_for_discord(&text);
        assert_eq!(cut.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn snowflakes_must_be_non_zero_numbers() {
        let id: Id<ChannelMarker> = parse_snowflake("1081234567890123456").unwrap();
        assert_eq!(id.get(), 1081234567890123456);
        assert!(parse_snowflake::<ChannelMarker>("0").is_err());
        assert!(parse_snowflake::<ChannelMarker>("general").is_err());
    }
}
