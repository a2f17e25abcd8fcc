pub mod attributes;
pub mod lists;
pub mod normalize;
pub mod plain;
pub mod repair;
pub mod split;
pub mod string;
pub mod token;
pub mod validate;

use std::panic::{self, AssertUnwindSafe};

use self::{
    attributes::strip_attributes,
    lists::{flatten_lists, tidy_lines},
    normalize::normalize_tags,
    repair::fix_unclosed_tags,
    split::{ChunksIterator, TELEGRAM_MAX_CAPTION_LENGTH},
    token::char_len,
};

const TRUNCATION_MARKER: &str = "...";

/// Runs one formatter stage, falling back to its input if the stage panics
fn run_stage(name: &str, input: String, stage: fn(&str) -> String) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| stage(&input))) {
        Ok(output) => {
            log::debug!("{name}: {} -> {} bytes", input.len(), output.len());
            output
        }
        Err(_) => {
            log::error!("{name} failed, passing its input through unchanged");
            input
        }
    }
}

/// Converts editor HTML into markup Telegram renders with `parse_mode=HTML`.
///
/// Never fails: whatever the input, the result only uses the allowed tags,
/// and they are balanced. Whitespace is tidied last, after every stage that
/// may remove tags or turn them into line breaks.
pub fn format_html_for_telegram(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let html = run_stage("normalize_tags", html.to_string(), normalize_tags);
    let html = run_stage("flatten_lists", html, flatten_lists);
    let html = run_stage("strip_attributes", html, strip_attributes);
    let html = run_stage("fix_unclosed_tags", html, fix_unclosed_tags);
    run_stage("tidy_lines", html, tidy_lines)
}

/// Formats `html` for use as a photo caption.
///
/// Captions longer than 1024 characters keep their first balanced chunk
/// followed by "...".
pub fn create_image_caption(html: &str) -> String {
    let formatted = format_html_for_telegram(html);
    if char_len(&formatted) <= TELEGRAM_MAX_CAPTION_LENGTH {
        return formatted;
    }

    let max_content_len = TELEGRAM_MAX_CAPTION_LENGTH - TRUNCATION_MARKER.len();
    let mut caption = ChunksIterator::new(&formatted, max_content_len)
        .next()
        .map(|chunk| chunk.text)
        .unwrap_or_default();
    caption.push_str(TRUNCATION_MARKER);
    caption
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        plain::strip_html,
        split::{TELEGRAM_MAX_MESSAGE_LENGTH, split_long_message},
        validate::is_valid_telegram_html,
        *,
    };

    const EDITOR_POST: &str = r#"<!DOCTYPE html>
<h1 class="title">Weekly <em>digest</em></h1>
<p>Hello <strong style="color:red">everyone</strong> &amp; welcome!</p>
<p><span style="font-weight: bold; font-style: italic">Highlights</span>:</p>
<ul>
  <li>First <a href="https://example.com/a?x=1&y=2" target="_blank">link</a></li>
  <li>Second
    <ol>
      <li><del>old</del> <ins>new</ins></li>
    </ol>
  </li>
</ul>
<div>Code: <code class="lang-rs">a < b</code></div>
<pre>fn main() {
    println!("hi");
}</pre>
<table><tr><td>cell</td></tr></table>
<p>Unclosed <b>bold <i>and italic</p>"#;

    #[test]
    fn test_empty_input() {
        assert_eq!(format_html_for_telegram(""), "");
        assert_eq!(format_html_for_telegram("  \n\t "), "");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(format_html_for_telegram("just text"), "just text");
    }

    #[test]
    fn test_editor_post_is_valid_telegram_html() {
        let formatted = format_html_for_telegram(EDITOR_POST);

        assert!(is_valid_telegram_html(&formatted), "{formatted}");
        assert!(formatted.starts_with("Weekly <i>digest</i>\n\nHello <b>everyone</b> &amp; welcome!"));
        assert!(formatted.contains("<b><i>Highlights</i></b>:"));
        assert!(formatted.contains(r#"• First <a href="https://example.com/a?x=1&amp;y=2">link</a>"#));
        assert!(formatted.contains("• Second\n    ◦ <s>old</s> <u>new</u>\n"));
        assert!(formatted.contains("Code: <code>a &lt; b</code>"));
        assert!(formatted.contains("<pre>fn main() {\n    println!(\"hi\");\n}</pre>"));
        assert!(formatted.contains("cell"));
        assert!(formatted.ends_with("Unclosed <b>bold <i>and italic</i></b>"));
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let inputs = [
            EDITOR_POST,
            "<b>Hi",
            "<ul><li>A</li><li>B<ul><li>C</li></ul></li></ul>",
            "<p>One</p><p>Two</p>",
            "plain</i> text",
            "1 < 2 && 3 > 2",
            r#"<a href='https://t.me/x'>l</a> <pre><code>x</code></pre>"#,
        ];
        for input in inputs {
            let once = format_html_for_telegram(input);
            assert_eq!(format_html_for_telegram(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_whitespace_left_by_removed_tags_is_tidied() {
        let cases = [
            ("<div><div>Hello</div></div>world", "Hello\nworld"),
            ("<p>One<p>Two", "One\n\nTwo"),
            ("</b>\n\n\nx", "x"),
            ("<div>Hi", "Hi"),
            ("<span></span>  after an empty span", "after an empty span"),
            ("<span class=\"x\"> </span>  spaced", "spaced"),
            (
                "   <a href=\"https://t.me/x\" rel=\"nofollow\">link</a>",
                r#"<a href="https://t.me/x">link</a>"#,
            ),
            ("<p>Para <b>open</p>", "Para <b>open</b>"),
        ];
        for (input, expected) in cases {
            let once = format_html_for_telegram(input);
            assert_eq!(once, expected, "input: {input:?}");
            assert_eq!(once, once.trim(), "input: {input:?}");
            assert_eq!(format_html_for_telegram(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_typed_bullet_is_trimmed_through_pipeline() {
        assert_eq!(
            format_html_for_telegram("<ul><li>real</li></ul><p>   • typed</p>"),
            "• real\n• typed"
        );
    }

    #[test]
    fn test_list_scenario_through_pipeline() {
        let formatted = format_html_for_telegram("<ul><li>A</li><li>B<ul><li>C</li></ul></li></ul>");
        assert_eq!(formatted, "• A\n• B\n    ◦ C");
    }

    #[test]
    fn test_orphan_close_scenario_through_pipeline() {
        let formatted = format_html_for_telegram("some</i> text");
        assert!(!formatted.contains("<i>") && !formatted.contains("</i>"));
    }

    #[test]
    fn test_long_formatted_post_splits_into_sound_chunks() {
        let html = format!("<b>{}</b>", "a".repeat(5000));
        let formatted = format_html_for_telegram(&html);
        let chunks = split_long_message(&formatted, TELEGRAM_MAX_MESSAGE_LENGTH);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(char_len(chunk) <= TELEGRAM_MAX_MESSAGE_LENGTH);
            assert!(is_valid_telegram_html(chunk));
        }
        let rebuilt: String = chunks.iter().map(|chunk| strip_html(chunk)).collect();
        assert_eq!(rebuilt, strip_html(&formatted));
    }

    #[test]
    fn test_short_caption_is_formatted_only() {
        assert_eq!(create_image_caption("<p><strong>Nice</strong> photo</p>"), "<b>Nice</b> photo");
    }

    #[test]
    fn test_long_caption_is_truncated() {
        let caption = create_image_caption(&format!("<i>{}</i>", "word ".repeat(400)));
        assert_eq!(char_len(&caption), TELEGRAM_MAX_CAPTION_LENGTH);
        assert!(caption.ends_with("</i>..."));
        assert!(is_valid_telegram_html(&caption));
    }
}
