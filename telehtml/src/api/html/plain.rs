use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{
    repair::fix_unclosed_tags,
    token::{TagKind, Token, tokenize},
};

/// Tags kept by [`strip_to_inline`]
pub const INLINE_TAGS: [&str; 5] = ["b", "i", "u", "s", "code"];

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|([a-zA-Z][a-zA-Z0-9]*));")
        .expect("entity pattern compiles")
});

/// Removes every tag, leaving text (and entities) as they are
pub fn strip_html(html: &str) -> String {
    tokenize(html)
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(text),
            Token::Tag(_) => None,
        })
        .collect()
}

/// Removes every tag and decodes the entities Telegram would display as characters.
///
/// Unknown named entities are left as written.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_html(html))
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Reduces markup to `<b>`, `<i>`, `<u>`, `<s>` and `<code>` without attributes.
///
/// Used as the middle step when Telegram refuses the full markup.
pub fn strip_to_inline(html: &str) -> String {
    let mut out = String::with_capacity(html.len());

    for token in tokenize(html) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Tag(tag) if INLINE_TAGS.contains(&tag.name.as_str()) => match tag.kind {
                TagKind::Open => {
                    out.push('<');
                    out.push_str(&tag.name);
                    out.push('>');
                }
                TagKind::Close => {
                    out.push_str("</");
                    out.push_str(&tag.name);
                    out.push('>');
                }
                TagKind::SelfClosing => {}
            },
            Token::Tag(_) => {}
        }
    }

    fix_unclosed_tags(&out)
}
