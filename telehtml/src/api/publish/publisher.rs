use std::{future::Future, sync::Arc, time::Duration};

use serde::Serialize;
use teloxide::types::{MessageId, ParseMode, Recipient};

use super::{
    chat::ChatTarget,
    client::{MediaPhoto, TelegramApi},
    error::PublishError,
    post::Post,
};
use crate::api::html::{
    split::{TELEGRAM_MAX_CAPTION_LENGTH, TELEGRAM_MAX_MESSAGE_LENGTH},
    string::TelegramHtml,
};

/// Limits and pacing of a publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    pub max_message_length: usize,
    pub max_caption_length: usize,
    pub max_media_group: usize,
    /// Pause between parts of a split message
    pub part_delay: Duration,
    /// Pause between photos sent one by one, and between photos and text
    pub media_delay: Duration,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            max_message_length: TELEGRAM_MAX_MESSAGE_LENGTH,
            max_caption_length: TELEGRAM_MAX_CAPTION_LENGTH,
            max_media_group: 10,
            part_delay: Duration::from_millis(300),
            media_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub message_ids: Vec<i32>,
    /// Link to the first message of the publication
    pub url: Option<String>,
}

/// Sends posts to one chat.
///
/// The chat username is looked up once on [`TelegramPublisher::connect`]
/// and used for message links afterwards.
pub struct TelegramPublisher {
    api: Arc<dyn TelegramApi>,
    chat: ChatTarget,
    recipient: Recipient,
    chat_username: Option<String>,
    settings: PublishSettings,
}

impl TelegramPublisher {
    pub async fn connect(
        api: Arc<dyn TelegramApi>,
        chat_id: &str,
        settings: PublishSettings,
    ) -> Result<Self, PublishError> {
        let chat = ChatTarget::parse(chat_id)?;
        let recipient = chat.recipient();

        let chat_username = match chat.username() {
            Some(username) => Some(username.to_string()),
            None => match api.chat_username(&recipient).await {
                Ok(username) => username,
                Err(err) => {
                    log::warn!("Could not look up username of chat {chat}: {err}");
                    None
                }
            },
        };
        log::info!(
            "Publishing to chat {chat} (username: {})",
            chat_username.as_deref().unwrap_or("none")
        );

        Ok(Self {
            api,
            chat,
            recipient,
            chat_username,
            settings,
        })
    }

    pub fn chat(&self) -> &ChatTarget {
        &self.chat
    }

    pub fn message_url(&self, message_id: MessageId) -> String {
        self.chat
            .message_url(self.chat_username.as_deref(), message_id)
    }

    /// Publishes a post, choosing between a photo with caption, a media group
    /// and separate photos followed by text.
    pub async fn publish(&self, post: &Post) -> Result<PublishOutcome, PublishError> {
        let text = post.formatted_text();
        let images = post.image_urls();

        if text.is_empty() && images.is_empty() {
            return Err(PublishError::EmptyPost);
        }

        let caption_fits = text.plain_len() <= self.settings.max_caption_length;
        let caption = (!text.is_empty()).then_some(&text);

        let message_ids = match images.len() {
            0 => self.send_html(&text).await?,
            1 if caption_fits => vec![self.send_photo(&images[0], caption).await?],
            count if caption_fits && count <= self.settings.max_media_group => {
                self.send_media_group(&images, caption).await?
            }
            _ => {
                let mut ids = self.send_images(&images).await?;
                if !text.is_empty() {
                    tokio::time::sleep(self.settings.media_delay).await;
                    ids.extend(self.send_html(&text).await?);
                }
                ids
            }
        };

        let url = message_ids.first().map(|id| self.message_url(*id));
        if let Some(url) = &url {
            log::info!("Published {} message(s), first at {url}", message_ids.len());
        }

        Ok(PublishOutcome {
            message_ids: message_ids.into_iter().map(|id| id.0).collect(),
            url,
        })
    }

    /// Sends formatted text, split into several messages when it is too long
    pub async fn send_html(&self, html: &TelegramHtml) -> Result<Vec<MessageId>, PublishError> {
        let parts: Vec<TelegramHtml> = html.chunks(self.settings.max_message_length).collect();
        if parts.len() > 1 {
            log::info!("Message is {} characters long, sending in {} parts", html.len(), parts.len());
        }

        let mut ids = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.part_delay).await;
            }
            let id = self
                .with_format_fallback(part, move |text, parse_mode| async move {
                    self.api
                        .post_message(&self.recipient, &text, parse_mode)
                        .await
                })
                .await?;
            ids.push(id);
        }
        Ok(ids)
    }

    pub async fn send_photo(
        &self,
        url: &str,
        caption: Option<&TelegramHtml>,
    ) -> Result<MessageId, PublishError> {
        let Some(caption) = caption else {
            return self
                .api
                .post_photo(&self.recipient, url, None, None)
                .await;
        };

        self.with_format_fallback(caption, move |caption, parse_mode| async move {
            self.api
                .post_photo(&self.recipient, url, Some(&caption), parse_mode)
                .await
        })
        .await
    }

    /// Sends photos as one album with the caption under the first one.
    ///
    /// When Telegram cannot fetch one of the URLs the photos are sent one by one instead.
    pub async fn send_media_group(
        &self,
        urls: &[String],
        caption: Option<&TelegramHtml>,
    ) -> Result<Vec<MessageId>, PublishError> {
        let result = match caption {
            Some(caption) => {
                self.with_format_fallback(caption, move |caption, parse_mode| {
                    let photos = album(urls, Some(caption), parse_mode);
                    async move { self.api.post_media_group(&self.recipient, &photos).await }
                })
                .await
            }
            None => {
                self.api
                    .post_media_group(&self.recipient, &album(urls, None, None))
                    .await
            }
        };

        match result {
            Err(err) if err.is_media_error() => {
                log::warn!("Media group rejected ({err}), sending {} photos one by one", urls.len());
                self.send_images_sequentially(urls, caption).await
            }
            result => result,
        }
    }

    /// Photos without caption, in consecutive albums of at most
    /// `max_media_group`; a batch of one goes out as a single photo
    async fn send_images(&self, urls: &[String]) -> Result<Vec<MessageId>, PublishError> {
        let batch_size = self.settings.max_media_group.max(1);
        let mut ids = Vec::with_capacity(urls.len());

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.media_delay).await;
            }
            match batch {
                [url] => ids.push(self.send_photo(url, None).await?),
                _ => ids.extend(self.send_media_group(batch, None).await?),
            }
        }
        Ok(ids)
    }

    /// Sends photos one at a time, skipping those that fail.
    ///
    /// The caption goes to the first photo that gets through. Fails only if none did.
    pub async fn send_images_sequentially(
        &self,
        urls: &[String],
        mut caption: Option<&TelegramHtml>,
    ) -> Result<Vec<MessageId>, PublishError> {
        let mut ids = Vec::with_capacity(urls.len());
        let mut last_error = None;

        for (index, url) in urls.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.media_delay).await;
            }
            match self.send_photo(url, caption).await {
                Ok(id) => {
                    ids.push(id);
                    caption = None;
                }
                Err(err) => {
                    log::warn!("Skipping photo {url}: {err}");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if ids.is_empty() => Err(err),
            _ => Ok(ids),
        }
    }

    /// Sends `html` with `send`, stepping down to inline-only markup and then
    /// to plain text while Telegram answers with a bad request
    async fn with_format_fallback<T, F, Fut>(
        &self,
        html: &TelegramHtml,
        mut send: F,
    ) -> Result<T, PublishError>
    where
        F: FnMut(String, Option<ParseMode>) -> Fut,
        Fut: Future<Output = Result<T, PublishError>>,
    {
        match send(html.as_str().to_string(), Some(ParseMode::Html)).await {
            Err(err) if err.is_bad_request() => {
                log::warn!("Telegram rejected the markup ({err}), retrying with inline tags only");
            }
            result => return result,
        }

        match send(html.to_inline().into_string(), Some(ParseMode::Html)).await {
            Err(err) if err.is_bad_request() => {
                log::warn!("Telegram rejected inline markup too ({err}), sending plain text");
            }
            result => return result,
        }

        send(html.plain_text(), None).await
    }
}

fn album(urls: &[String], caption: Option<String>, parse_mode: Option<ParseMode>) -> Vec<MediaPhoto> {
    let mut caption = caption;
    urls.iter()
        .map(|url| match caption.take() {
            Some(caption) => MediaPhoto::new(url).with_caption(caption, parse_mode),
            None => MediaPhoto::new(url),
        })
        .collect()
}
