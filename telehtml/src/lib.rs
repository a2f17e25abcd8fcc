//! Telehtml - turns editor HTML into Telegram messages and publishes them

// Private API modules
pub(crate) mod api;

// Public html module with re-exports
pub mod html {
    // Formatter pipeline and its stages
    pub use crate::api::html::{
        attributes::strip_attributes,
        create_image_caption, format_html_for_telegram,
        lists::{LIST_GLYPHS, flatten_lists, tidy_lines},
        normalize::normalize_tags,
        plain::{INLINE_TAGS, decode_entities, plain_text, strip_html, strip_to_inline},
        repair::{TagStackEntry, fix_unclosed_tags},
        split::{
            ChunksIterator, MessageChunk, TELEGRAM_MAX_CAPTION_LENGTH,
            TELEGRAM_MAX_MESSAGE_LENGTH, split_long_message,
        },
        string::TelegramHtml,
        token::ALLOWED_TAGS,
        validate::is_valid_telegram_html,
    };
}

// Public publish module with re-exports
pub mod publish {
    pub use crate::api::publish::{
        chat::ChatTarget,
        client::{MediaPhoto, TelegramApi},
        error::PublishError,
        post::{AdditionalImage, Post},
        publisher::{PublishOutcome, PublishSettings, TelegramPublisher},
    };
}
