use std::sync::LazyLock;

use regex::Regex;

/// Tags Telegram renders when a message is sent with `parse_mode=HTML`
pub const ALLOWED_TAGS: [&str; 7] = ["b", "i", "u", "s", "code", "pre", "a"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/)?([a-zA-Z][a-zA-Z0-9]*)((?:\s[^<>]*?)?)\s*(/)?>")
        .expect("tag pattern compiles")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);")
        .expect("entity pattern compiles")
});

pub fn is_allowed_tag(name: &str) -> bool {
    ALLOWED_TAGS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// A single tag as it appears in the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'a> {
    /// The tag exactly as written, e.g. `<A HREF="x">`
    pub raw: &'a str,
    /// Lowercased tag name
    pub name: String,
    /// Everything between the name and the closing `>` (or `/>`)
    pub attrs: &'a str,
    pub kind: TagKind,
    /// Byte offset right after the tag
    pub end: usize,
}

impl TagToken<'_> {
    pub fn is_allowed(&self) -> bool {
        is_allowed_tag(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Tag(TagToken<'a>),
}

/// Splits markup into text runs and tags, in document order.
///
/// Anything that does not look like a tag (a lone `<`, comments, `<3`)
/// stays inside the surrounding text token.
pub fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };

        if whole.start() > last {
            tokens.push(Token::Text(&html[last..whole.start()]));
        }

        let kind = if caps.get(1).is_some() {
            TagKind::Close
        } else if caps.get(4).is_some() {
            TagKind::SelfClosing
        } else {
            TagKind::Open
        };

        tokens.push(Token::Tag(TagToken {
            raw: whole.as_str(),
            name: name.as_str().to_lowercase(),
            attrs: caps.get(3).map_or("", |m| m.as_str()),
            kind,
            end: whole.end(),
        }));
        last = whole.end();
    }

    if last < html.len() {
        tokens.push(Token::Text(&html[last..]));
    }

    tokens
}

/// Length in bytes of the HTML entity starting at byte `pos`, if any
pub fn entity_len_at(text: &str, pos: usize) -> Option<usize> {
    ENTITY_RE
        .find_at(text, pos)
        .filter(|m| m.start() == pos)
        .map(|m| m.len())
}

pub fn closing_tag(name: &str) -> String {
    format!("</{name}>")
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
