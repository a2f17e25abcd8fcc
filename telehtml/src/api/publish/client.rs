use teloxide::{
    Bot,
    payloads::{SendMessageSetters, SendPhotoSetters},
    prelude::Requester,
    types::{InputFile, InputMedia, InputMediaPhoto, MessageId, ParseMode, Recipient},
};

use super::error::PublishError;

/// A photo inside a media group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPhoto {
    pub url: String,
    pub caption: Option<String>,
    pub parse_mode: Option<ParseMode>,
}

impl MediaPhoto {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: None,
            parse_mode: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>, parse_mode: Option<ParseMode>) -> Self {
        self.caption = Some(caption.into());
        self.parse_mode = parse_mode;
        self
    }
}

/// The Bot API calls the publisher relies on
#[async_trait::async_trait]
pub trait TelegramApi: Send + Sync {
    /// `sendMessage`; `parse_mode: None` sends the text as is
    async fn post_message(
        &self,
        chat: &Recipient,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, PublishError>;

    /// `sendPhoto` with a photo Telegram downloads from `url`
    async fn post_photo(
        &self,
        chat: &Recipient,
        url: &str,
        caption: Option<&str>,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, PublishError>;

    /// `sendMediaGroup` with 2 to 10 photos
    async fn post_media_group(
        &self,
        chat: &Recipient,
        photos: &[MediaPhoto],
    ) -> Result<Vec<MessageId>, PublishError>;

    /// Username of the chat from `getChat`, if it has one
    async fn chat_username(&self, chat: &Recipient) -> Result<Option<String>, PublishError>;
}

fn parse_media_url(url: &str) -> Result<url::Url, PublishError> {
    url::Url::parse(url).map_err(|source| PublishError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

#[async_trait::async_trait]
impl TelegramApi for Bot {
    async fn post_message(
        &self,
        chat: &Recipient,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, PublishError> {
        let mut request = Requester::send_message(self, chat.clone(), text);
        if let Some(parse_mode) = parse_mode {
            request = request.parse_mode(parse_mode);
        }
        let message = request.await?;
        Ok(message.id)
    }

    async fn post_photo(
        &self,
        chat: &Recipient,
        url: &str,
        caption: Option<&str>,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageId, PublishError> {
        let photo = InputFile::url(parse_media_url(url)?);
        let mut request = Requester::send_photo(self, chat.clone(), photo);
        if let Some(caption) = caption {
            request = request.caption(caption);
            if let Some(parse_mode) = parse_mode {
                request = request.parse_mode(parse_mode);
            }
        }
        let message = request.await?;
        Ok(message.id)
    }

    async fn post_media_group(
        &self,
        chat: &Recipient,
        photos: &[MediaPhoto],
    ) -> Result<Vec<MessageId>, PublishError> {
        let mut media = Vec::with_capacity(photos.len());
        for photo in photos {
            let mut item = InputMediaPhoto::new(InputFile::url(parse_media_url(&photo.url)?));
            if let Some(caption) = &photo.caption {
                item = item.caption(caption.clone());
                if let Some(parse_mode) = photo.parse_mode {
                    item = item.parse_mode(parse_mode);
                }
            }
            media.push(InputMedia::Photo(item));
        }

        let messages = Requester::send_media_group(self, chat.clone(), media).await?;
        Ok(messages.into_iter().map(|message| message.id).collect())
    }

    async fn chat_username(&self, chat: &Recipient) -> Result<Option<String>, PublishError> {
        let chat = Requester::get_chat(self, chat.clone()).await?;
        Ok(chat.username().map(str::to_string))
    }
}
