use std::sync::LazyLock;

use regex::Regex;

use super::token::{TagKind, TagToken, Token, closing_tag, entity_len_at, tokenize};

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern compiles")
});

/// Keeps only allowed tags, without attributes except `href` on anchors.
///
/// Text between tags is escaped so that stray `<`, `>` and `&` cannot
/// break Telegram's parser. Entities that are already present stay intact.
pub fn strip_attributes(html: &str) -> String {
    let mut out = String::with_capacity(html.len());

    for token in tokenize(html) {
        match token {
            Token::Text(text) => escape_text_into(&mut out, text),
            Token::Tag(tag) if tag.is_allowed() => match tag.kind {
                TagKind::Open if tag.name == "a" => out.push_str(&anchor_open(tag.attrs)),
                TagKind::Open => {
                    out.push('<');
                    out.push_str(&tag.name);
                    out.push('>');
                }
                TagKind::Close => out.push_str(&closing_tag(&tag.name)),
                // <b/> renders nothing and Telegram rejects it
                TagKind::SelfClosing => {}
            },
            Token::Tag(tag) => out.push_str(foreign_tag_replacement(&tag)),
        }
    }

    out
}

fn foreign_tag_replacement(tag: &TagToken<'_>) -> &'static str {
    match (tag.name.as_str(), tag.kind) {
        ("br", _) => "\n",
        ("p", TagKind::Open) => "\n\n",
        ("div", TagKind::Open) => "\n",
        _ => "",
    }
}

fn anchor_open(attrs: &str) -> String {
    let href = HREF_RE
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)));

    match href {
        Some(href) => {
            let mut escaped = String::with_capacity(href.len());
            escape_text_into(&mut escaped, href.as_str());
            format!("<a href=\"{}\">", escaped.replace('"', "&quot;"))
        }
        None => "<a>".to_string(),
    }
}

pub(crate) fn escape_text_into(out: &mut String, text: &str) {
    for (pos, ch) in text.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if entity_len_at(text, pos).is_none() => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
}
