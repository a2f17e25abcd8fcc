use std::{fmt, ops::Add};

use super::{
    create_image_caption, format_html_for_telegram,
    plain::{plain_text, strip_to_inline},
    split::{ChunksIterator, TELEGRAM_MAX_MESSAGE_LENGTH},
    token::char_len,
};

/// A wrapper around String holding markup that Telegram accepts with `parse_mode=HTML`.
///
/// This struct can only be constructed through safe methods:
/// 1. `format` - runs arbitrary editor HTML through the formatter pipeline
/// 2. `escape` - escapes `<`, `>` and `&` in plain text
/// 3. `new` - creates an empty TelegramHtml
/// 4. `From`/`Into` - escapes the input, same as `escape`
///
/// `from_validated_string` exists for code that already holds pipeline output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TelegramHtml(String);

impl TelegramHtml {
    /// Formats editor HTML into Telegram markup.
    ///
    /// # Example
    /// ```rust
    /// use telehtml::html::TelegramHtml;
    ///
    /// let html = TelegramHtml::format("<p><strong>Hi</strong></p>");
    /// assert_eq!(html.as_str(), "<b>Hi</b>");
    /// ```
    pub fn format(html: &str) -> Self {
        TelegramHtml(format_html_for_telegram(html))
    }

    /// Escapes plain text so it shows up literally.
    ///
    /// # Example
    /// ```rust
    /// use telehtml::html::TelegramHtml;
    ///
    /// let html = TelegramHtml::escape("1 < 2 & 3");
    /// assert_eq!(html.as_str(), "1 &lt; 2 &amp; 3");
    /// ```
    pub fn escape<T: Into<String>>(input: T) -> Self {
        let input_string = input.into();
        TelegramHtml(teloxide::utils::html::escape(&input_string))
    }

    pub fn new() -> Self {
        TelegramHtml(String::new())
    }

    /// Wraps markup that is known to be valid already, without any checks
    #[doc(hidden)]
    pub fn from_validated_string(s: impl Into<String>) -> Self {
        TelegramHtml(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, the way Telegram counts message limits
    pub fn len(&self) -> usize {
        char_len(&self.0)
    }

    /// Text as the reader sees it: no tags, entities decoded
    pub fn plain_text(&self) -> String {
        plain_text(&self.0)
    }

    /// Length of the visible text, which is what caption limits apply to
    pub fn plain_len(&self) -> usize {
        char_len(&self.plain_text())
    }

    /// Iterator over balanced chunks, each not longer than `max_length` characters
    pub fn chunks(&self, max_length: usize) -> impl Iterator<Item = TelegramHtml> + '_ {
        ChunksIterator::new(&self.0, max_length).map(|chunk| TelegramHtml(chunk.text))
    }

    /// Splits into chunks fitting into a single Telegram message
    pub fn split_by_max_length(&self) -> Vec<TelegramHtml> {
        self.chunks(TELEGRAM_MAX_MESSAGE_LENGTH).collect()
    }

    /// Caption form: at most 1024 characters, truncated with "..."
    pub fn to_caption(&self) -> TelegramHtml {
        TelegramHtml(create_image_caption(&self.0))
    }

    /// Same markup reduced to `<b>`, `<i>`, `<u>`, `<s>` and `<code>`
    pub fn to_inline(&self) -> TelegramHtml {
        TelegramHtml(strip_to_inline(&self.0))
    }
}

impl fmt::Display for TelegramHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TelegramHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<TelegramHtml> for String {
    fn from(html: TelegramHtml) -> String {
        html.0
    }
}

impl From<String> for TelegramHtml {
    fn from(s: String) -> Self {
        TelegramHtml::escape(s)
    }
}

impl From<&str> for TelegramHtml {
    fn from(s: &str) -> Self {
        TelegramHtml::escape(s)
    }
}

impl Add for TelegramHtml {
    type Output = TelegramHtml;

    fn add(self, other: TelegramHtml) -> TelegramHtml {
        TelegramHtml(self.0 + &other.0)
    }
}

impl Add<&TelegramHtml> for TelegramHtml {
    type Output = TelegramHtml;

    fn add(self, other: &TelegramHtml) -> TelegramHtml {
        TelegramHtml(self.0 + &other.0)
    }
}
