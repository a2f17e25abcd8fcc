//! Rewrites editor markup onto the tags Telegram understands.
//!
//! Matching is regex based: a styled `<span>` is only converted when its
//! content has no nested tags.

use std::sync::LazyLock;

use regex::{Captures, Regex};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!(stringify!($name), " compiles")));
    };
}

pattern!(MARKUP_NOISE_RE, r"(?is)<!--.*?-->|<\?.*?\?>|<!DOCTYPE[^>]*>|<!\[CDATA\[.*?\]\]>");
pattern!(STYLED_SPAN_RE, r"(?is)<span\b([^>]*)>([^<]*)</span\s*>");
pattern!(ALIAS_RE, r"(?i)<(/?)(strong|em|ins|strike|del)\b[^>]*>");
pattern!(HEADING_RE, r"(?is)<h[1-6]\b[^>]*>(.*?)</h[1-6]\s*>");
pattern!(BR_RE, r"(?i)<br\b[^>]*>");
pattern!(PARAGRAPH_RE, r"(?is)<p\b[^>]*>(.*?)</p\s*>");
pattern!(DIV_RE, r"(?is)<div\b[^>]*>(.*?)</div\s*>");

pattern!(BOLD_STYLE_RE, r"(?i)font-weight\s*:\s*(?:bold|bolder|[6-9]00)\b");
pattern!(ITALIC_STYLE_RE, r"(?i)font-style\s*:\s*(?:italic|oblique)");
pattern!(UNDERLINE_STYLE_RE, r"(?i)text-decoration(?:-line)?\s*:[^;]*underline");
pattern!(STRIKE_STYLE_RE, r"(?i)text-decoration(?:-line)?\s*:[^;]*line-through");
pattern!(CLASS_RE, r#"(?i)\bclass\s*=\s*["']([^"']*)["']"#);

/// Normalizes formatting idioms into `<b>`, `<i>`, `<u>`, `<s>` and line breaks.
///
/// Tags it does not know about are passed through for the later stages.
pub fn normalize_tags(html: &str) -> String {
    let html = MARKUP_NOISE_RE.replace_all(html, "");
    let html = STYLED_SPAN_RE.replace_all(&html, |caps: &Captures| restyle_span(&caps[1], &caps[2]));
    let html = ALIAS_RE.replace_all(&html, |caps: &Captures| {
        format!("<{}{}>", &caps[1], alias_target(&caps[2]))
    });
    let html = HEADING_RE.replace_all(&html, "${1}\n");
    let html = BR_RE.replace_all(&html, "\n");
    let html = PARAGRAPH_RE.replace_all(&html, "${1}\n\n");
    let html = DIV_RE.replace_all(&html, "${1}\n");
    html.into_owned()
}

fn alias_target(name: &str) -> &'static str {
    match name.to_ascii_lowercase().as_str() {
        "strong" => "b",
        "em" => "i",
        "ins" => "u",
        _ => "s",
    }
}

/// Wraps span content into every tag its inline style or class asks for
fn restyle_span(attrs: &str, content: &str) -> String {
    let class = CLASS_RE
        .captures(attrs)
        .map(|caps| caps[1].to_ascii_lowercase())
        .unwrap_or_default();

    let wanted = [
        ("b", BOLD_STYLE_RE.is_match(attrs) || class.contains("bold")),
        ("i", ITALIC_STYLE_RE.is_match(attrs) || class.contains("italic")),
        ("u", UNDERLINE_STYLE_RE.is_match(attrs) || class.contains("underline")),
        (
            "s",
            STRIKE_STYLE_RE.is_match(attrs)
                || class.contains("strike")
                || class.contains("line-through"),
        ),
    ];

    let tags: Vec<&str> = wanted
        .iter()
        .filter(|(_, on)| *on)
        .map(|(tag, _)| *tag)
        .collect();

    let mut result = String::with_capacity(content.len() + tags.len() * 7);
    for tag in &tags {
        result.push_str(&format!("<{tag}>"));
    }
    result.push_str(content);
    for tag in tags.iter().rev() {
        result.push_str(&format!("</{tag}>"));
    }
    result
}
