use super::token::{TagKind, Token, closing_tag, tokenize};

/// An allowed tag that is currently open, with the byte offset right after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStackEntry {
    pub name: String,
    pub opened_at: usize,
}

/// Balances allowed tags so that every opened tag is closed in nesting order.
///
/// * a close tag for something deeper in the stack first closes every tag above it
/// * a close tag with no matching open tag is dropped
/// * whatever is still open at the end gets closed, innermost first, right
///   after the last non-whitespace character
///
/// Self-closing tags and tags outside the allowed set pass through untouched.
pub fn fix_unclosed_tags(html: &str) -> String {
    if !html.contains('<') {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + 16);
    let mut stack: Vec<TagStackEntry> = Vec::new();

    for token in tokenize(html) {
        let tag = match token {
            Token::Text(text) => {
                out.push_str(text);
                continue;
            }
            Token::Tag(tag) => tag,
        };

        if !tag.is_allowed() {
            out.push_str(tag.raw);
            continue;
        }

        match tag.kind {
            TagKind::SelfClosing => out.push_str(tag.raw),
            TagKind::Open => {
                out.push_str(tag.raw);
                stack.push(TagStackEntry {
                    name: tag.name,
                    opened_at: tag.end,
                });
            }
            TagKind::Close => match stack.iter().rposition(|entry| entry.name == tag.name) {
                Some(pos) => {
                    let crossed = stack.split_off(pos + 1);
                    for entry in crossed.iter().rev() {
                        log::debug!(
                            "Closing <{}> opened at offset {} before {}",
                            entry.name,
                            entry.opened_at,
                            tag.raw
                        );
                        out.push_str(&closing_tag(&entry.name));
                    }
                    stack.pop();
                    out.push_str(tag.raw);
                }
                None => {
                    log::debug!("Dropping orphan {} ending at offset {}", tag.raw, tag.end);
                }
            },
        }
    }

    let trailing = out.split_off(out.trim_end().len());
    for entry in stack.iter().rev() {
        log::debug!(
            "Closing <{}> opened at offset {} at end of document",
            entry.name,
            entry.opened_at
        );
        out.push_str(&closing_tag(&entry.name));
    }
    out.push_str(&trailing);

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::html::validate::is_valid_telegram_html;

    #[test]
    fn test_unclosed_tag_is_closed() {
        assert_eq!(fix_unclosed_tags("<b>Hi"), "<b>Hi</b>");
    }

    #[test]
    fn test_remaining_tags_closed_innermost_first() {
        assert_eq!(fix_unclosed_tags("<b><i>x<u>y"), "<b><i>x<u>y</u></i></b>");
    }

    #[test]
    fn test_closers_go_before_trailing_whitespace() {
        assert_eq!(fix_unclosed_tags("<b>bold <i>it\n\n"), "<b>bold <i>it</i></b>\n\n");
    }

    #[test]
    fn test_orphan_close_removed() {
        let fixed = fix_unclosed_tags("plain</i> text");
        assert_eq!(fixed, "plain text");
        assert!(!fixed.contains("<i>") && !fixed.contains("</i>"));
    }

    #[test]
    fn test_interleaved_tags_are_nested() {
        let fixed = fix_unclosed_tags("<b>a<i>b</b>c</i>");
        assert_eq!(fixed, "<b>a<i>b</i></b>c");
        assert!(is_valid_telegram_html(&fixed));
    }

    #[test]
    fn test_balanced_input_unchanged() {
        let html = r#"<b>a</b> <a href="https://t.me">l</a> <pre><code>c</code></pre>"#;
        assert_eq!(fix_unclosed_tags(html), html);
    }

    #[test]
    fn test_self_closing_never_pushed() {
        assert_eq!(fix_unclosed_tags("<b/>x"), "<b/>x");
    }

    #[test]
    fn test_foreign_tags_pass_through() {
        assert_eq!(fix_unclosed_tags("<span>x"), "<span>x");
    }

    #[test]
    fn test_messy_input_always_balances() {
        let inputs = [
            "<b><i></b></i></u><s>",
            "</b></b><b>",
            "<code><pre>x</code>y</pre>",
            "<a href=\"x\"><b>link</a> rest</b>",
        ];
        for input in inputs {
            let fixed = fix_unclosed_tags(input);
            assert!(is_valid_telegram_html(&fixed), "{input} -> {fixed}");
        }
    }
}
