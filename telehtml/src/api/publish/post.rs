use serde::{Deserialize, Serialize};

use crate::api::html::string::TelegramHtml;

/// Content of a single publication, as stored in post files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Editor HTML; formatted before sending
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<AdditionalImage>,
}

/// Editors store extra images either as bare URLs or as objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalImage {
    Url(String),
    Object { url: String },
}

impl AdditionalImage {
    pub fn url(&self) -> &str {
        match self {
            AdditionalImage::Url(url) | AdditionalImage::Object { url } => url,
        }
    }
}

impl Post {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Main image first, then additional ones; blank entries are skipped
    pub fn image_urls(&self) -> Vec<String> {
        self.image_url
            .as_deref()
            .into_iter()
            .chain(self.additional_images.iter().map(AdditionalImage::url))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn formatted_text(&self) -> TelegramHtml {
        self.text
            .as_deref()
            .map(TelegramHtml::format)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.formatted_text().is_empty() && self.image_urls().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
text: "<p>Hello <strong>world</strong></p>"
image_url: https://example.com/a.jpg
additional_images:
  - https://example.com/b.jpg
  - url: https://example.com/c.jpg
  - "  "
"#;
        let post: Post = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            post.image_urls(),
            vec![
                "https://example.com/a.jpg",
                "https://example.com/b.jpg",
                "https://example.com/c.jpg",
            ]
        );
        assert_eq!(post.formatted_text().as_str(), "Hello <b>world</b>");
    }

    #[test]
    fn test_missing_fields_default() {
        let post: Post = serde_yaml::from_str("text: hi").unwrap();
        assert_eq!(post, Post::text("hi"));
        assert!(post.image_urls().is_empty());
    }

    #[test]
    fn test_empty_post() {
        assert!(Post::default().is_empty());
        assert!(Post::text("<p>  </p>").is_empty());
        assert!(!Post::text("x").is_empty());
    }
}
