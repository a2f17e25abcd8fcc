use std::sync::LazyLock;

use regex::Regex;

use super::token::{TagKind, Token, tokenize};

/// Bullet glyphs by nesting depth; deeper levels reuse the last one
pub const LIST_GLYPHS: [char; 5] = ['•', '◦', '▪', '▫', '⁃'];

const INDENT: &str = "    ";

static BLANK_RUNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank runs pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

/// Marker glyph for a list item at `depth` (1-based)
pub fn marker_for_depth(depth: usize) -> char {
    LIST_GLYPHS[depth.saturating_sub(1).min(LIST_GLYPHS.len() - 1)]
}

/// Replaces `<ul>/<ol>/<li>` structures with indented bullet lines.
///
/// Every `<li>` produces exactly one bullet line, in document order.
/// Whitespace around the lines is left for [`tidy_lines`], which the
/// formatter runs once every other stage is done.
pub fn flatten_lists(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut lists: Vec<ListKind> = Vec::new();
    // Whitespace between list tags is source indentation, not content
    let mut after_list_tag = false;
    let mut trim_item_start = false;
    let mut inside_item = false;

    for token in tokenize(html) {
        match token {
            Token::Tag(tag) if tag.name == "ul" || tag.name == "ol" => {
                let kind = if tag.name == "ul" {
                    ListKind::Unordered
                } else {
                    ListKind::Ordered
                };
                match tag.kind {
                    TagKind::Open => lists.push(kind),
                    TagKind::Close => {
                        if let Some(pos) = lists.iter().rposition(|open| *open == kind) {
                            lists.truncate(pos);
                            if lists.is_empty() {
                                out.push('\n');
                                inside_item = false;
                            }
                        }
                    }
                    TagKind::SelfClosing => {}
                }
                after_list_tag = true;
            }
            Token::Tag(tag) if tag.name == "li" => {
                if tag.kind == TagKind::Open {
                    // Text of the enclosing item may end with source indentation
                    if inside_item {
                        out.truncate(out.trim_end().len());
                    }
                    inside_item = true;
                    let depth = lists.len().max(1);
                    out.push('\n');
                    out.push_str(&INDENT.repeat(depth - 1));
                    out.push(marker_for_depth(depth));
                    out.push(' ');
                    trim_item_start = true;
                }
                after_list_tag = true;
            }
            Token::Tag(tag) => {
                out.push_str(tag.raw);
                after_list_tag = false;
            }
            Token::Text(text) => {
                if after_list_tag && text.trim().is_empty() {
                    continue;
                }
                if trim_item_start {
                    out.push_str(text.trim_start());
                } else {
                    out.push_str(text);
                }
                trim_item_start = false;
                after_list_tag = false;
            }
        }
    }

    out
}

/// Whether `line` has the exact shape [`flatten_lists`] gives a bullet:
/// the indent of its depth, the glyph of that depth, then a space or nothing.
fn is_bullet_line(line: &str) -> bool {
    let body = line.trim_start_matches(' ');
    let indent = line.len() - body.len();
    if indent % INDENT.len() != 0 {
        return false;
    }

    let mut chars = body.chars();
    chars.next() == Some(marker_for_depth(indent / INDENT.len() + 1))
        && matches!(chars.next(), None | Some(' '))
}

/// Trims leading whitespace of plain lines, trailing whitespace of all lines,
/// collapses blank line runs and trims the document.
///
/// Bullet lines keep their indentation and `<pre>` blocks are left as is.
pub fn tidy_lines(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_pre = false;

    for line in text.lines() {
        let tidy = if in_pre {
            line
        } else if is_bullet_line(line) {
            line.trim_end()
        } else {
            line.trim()
        };
        lines.push(tidy);
        in_pre = pre_state_after(line, in_pre);
    }

    let joined = lines.join("\n");
    BLANK_RUNS_RE.replace_all(&joined, "\n\n").trim().to_string()
}

fn pre_state_after(line: &str, mut in_pre: bool) -> bool {
    for token in tokenize(line) {
        if let Token::Tag(tag) = token {
            if tag.name == "pre" {
                in_pre = tag.kind == TagKind::Open;
            }
        }
    }
    in_pre
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn flat(html: &str) -> String {
        tidy_lines(&flatten_lists(html))
    }

    fn bullet_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|line| is_bullet_line(line)).collect()
    }

    #[test]
    fn test_nested_list() {
        let html = "<ul><li>A</li><li>B<ul><li>C</li></ul></li></ul>";
        assert_eq!(flat(html), "• A\n• B\n    ◦ C");
    }

    #[test]
    fn test_ordered_lists_use_glyphs_too() {
        assert_eq!(flat("<ol><li>one</li><li>two</li></ol>"), "• one\n• two");
    }

    #[test]
    fn test_deep_nesting_reuses_last_glyph() {
        let mut html = String::new();
        for depth in 1..=7 {
            html.push_str(&format!("<ul><li>L{depth}"));
        }
        for _ in 1..=7 {
            html.push_str("</li></ul>");
        }

        let text = flat(&html);
        let lines = bullet_lines(&text);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[4], format!("{}⁃ L5", INDENT.repeat(4)));
        assert_eq!(lines[5], format!("{}⁃ L6", INDENT.repeat(5)));
        assert_eq!(lines[6], format!("{}⁃ L7", INDENT.repeat(6)));
    }

    #[test]
    fn test_bullet_count_and_order_match_items() {
        let html = "<ul>\n  <li>first</li>\n  <li>second\n    <ol>\n      <li>third</li>\n      <li>fourth</li>\n    </ol>\n  </li>\n  <li>fifth</li>\n</ul>";
        let text = flat(html);
        let lines = bullet_lines(&text);
        assert_eq!(
            lines,
            vec!["• first", "• second", "    ◦ third", "    ◦ fourth", "• fifth"]
        );
    }

    #[test]
    fn test_indentation_grows_with_depth() {
        let text = flat("<ul><li>a<ul><li>b<ul><li>c</li></ul></li></ul></li></ul>");
        let indents: Vec<usize> = bullet_lines(&text)
            .iter()
            .map(|line| line.len() - line.trim_start().len())
            .collect();
        assert_eq!(indents, vec![0, 4, 8]);
    }

    #[test]
    fn test_text_after_list_starts_on_new_line() {
        assert_eq!(
            flat("Intro<ul><li>x</li></ul>After"),
            "Intro\n• x\nAfter"
        );
    }

    #[test]
    fn test_inline_markup_inside_items_is_kept() {
        assert_eq!(
            flat("<ul><li> <b>bold</b> <i>it</i></li></ul>"),
            "• <b>bold</b> <i>it</i>"
        );
    }

    #[test]
    fn test_cleanup_without_lists() {
        assert_eq!(flat("  a  \n\n\n\n   b\n"), "a\n\nb");
    }

    #[test]
    fn test_flatten_leaves_whitespace_to_tidy() {
        assert_eq!(flatten_lists("<ul><li>A</li></ul>"), "\n• A\n");
    }

    #[test]
    fn test_typed_glyphs_are_not_bullets() {
        assert_eq!(
            tidy_lines("   • typed by hand\n  ◦ also typed\n    • wrong glyph for depth"),
            "• typed by hand\n◦ also typed\n• wrong glyph for depth"
        );
    }

    #[test]
    fn test_typed_glyph_after_list_is_trimmed() {
        assert_eq!(
            flat("<ul><li>a<ul><li>b</li></ul></li></ul>\n   • not from a list"),
            "• a\n    ◦ b\n\n• not from a list"
        );
    }

    #[test]
    fn test_empty_item_keeps_indentation() {
        assert_eq!(flat("<ul><li>a<ul><li></li></ul></li></ul>"), "• a\n    ◦");
    }

    #[test]
    fn test_pre_blocks_keep_indentation() {
        assert_eq!(
            flat("<pre>fn main() {\n    run();\n}</pre>"),
            "<pre>fn main() {\n    run();\n}</pre>"
        );
    }

    #[test]
    fn test_orphan_list_item() {
        assert_eq!(flat("<li>lonely</li>"), "• lonely");
    }
}
