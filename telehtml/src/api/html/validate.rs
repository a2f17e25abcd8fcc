use super::token::{TagKind, Token, tokenize};

/// Checks that markup only uses tags Telegram accepts and that they nest properly.
///
/// Self-closing forms like `<b/>` are rejected: Telegram's parser does not know them.
pub fn is_valid_telegram_html(html: &str) -> bool {
    let mut stack: Vec<String> = Vec::new();

    for token in tokenize(html) {
        let Token::Tag(tag) = token else {
            continue;
        };
        if !tag.is_allowed() {
            return false;
        }
        match tag.kind {
            TagKind::SelfClosing => return false,
            TagKind::Open => stack.push(tag.name),
            TagKind::Close => {
                if stack.pop().as_deref() != Some(tag.name.as_str()) {
                    return false;
                }
            }
        }
    }

    stack.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_markup() {
        assert!(is_valid_telegram_html("plain"));
        assert!(is_valid_telegram_html(""));
        assert!(is_valid_telegram_html(
            r#"<b>a <i>b</i></b> <a href="https://t.me">c</a> <pre><code>d</code></pre>"#
        ));
    }

    #[test]
    fn test_unbalanced_markup() {
        assert!(!is_valid_telegram_html("<b>open"));
        assert!(!is_valid_telegram_html("close</b>"));
        assert!(!is_valid_telegram_html("<b><i>x</b></i>"));
    }

    #[test]
    fn test_foreign_and_self_closing_tags() {
        assert!(!is_valid_telegram_html("<span>x</span>"));
        assert!(!is_valid_telegram_html("a<br/>b"));
        assert!(!is_valid_telegram_html("<b/>"));
    }
}
