use teloxide::{ApiError, RequestError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid chat id {0:?}: expected @username, a numeric id or a t.me link")]
    InvalidChatId(String),

    #[error("Invalid media URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Nothing to publish: the post has neither text nor images")]
    EmptyPost,

    /// Telegram refused the request as malformed, usually the markup
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Telegram could not download a photo from the given URL
    #[error("Telegram could not fetch media: {0}")]
    MediaUrl(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Transport(String),
}

impl PublishError {
    /// Whether retrying with simpler markup may help
    pub fn is_bad_request(&self) -> bool {
        matches!(self, PublishError::BadRequest(_))
    }

    /// Whether the failure is about a photo URL rather than the request as a whole
    pub fn is_media_error(&self) -> bool {
        matches!(
            self,
            PublishError::MediaUrl(_) | PublishError::InvalidUrl { .. }
        )
    }
}

impl From<RequestError> for PublishError {
    fn from(err: RequestError) -> Self {
        let message = err.to_string();
        match err {
            RequestError::Api(ApiError::WrongFileIdOrUrl | ApiError::FailedToGetUrlContent) => {
                PublishError::MediaUrl(message)
            }
            RequestError::Api(ApiError::CantParseEntities(_)) => PublishError::BadRequest(message),
            RequestError::Api(ApiError::Unknown(description))
                if description.contains("Bad Request") =>
            {
                PublishError::BadRequest(description)
            }
            RequestError::Api(_) => PublishError::Api(message),
            _ => PublishError::Transport(message),
        }
    }
}
