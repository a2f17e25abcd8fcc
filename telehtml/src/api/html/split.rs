use super::token::{TagKind, Token, char_len, closing_tag, entity_len_at, tokenize};

pub const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;
pub const TELEGRAM_MAX_CAPTION_LENGTH: usize = 1024;

/// One message worth of markup, balanced on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChunk {
    pub text: String,
    /// Tags carried over from the previous chunk and re-opened at the start of this one
    pub open_tags_at_start: Vec<String>,
}

#[derive(Debug, Clone)]
struct OpenTag {
    name: String,
    markup: String,
}

/// Iterator over message chunks, each not longer than `max_length` characters.
///
/// Tags that are open when a chunk has to end are closed at its end and
/// re-opened (with their original attributes) at the start of the next one.
/// Text that cannot fit even into a fresh chunk is split between characters,
/// never inside an HTML entity. An entity longer than a whole chunk is dropped.
pub struct ChunksIterator<'a> {
    tokens: std::vec::IntoIter<Token<'a>>,
    pending: Option<Token<'a>>,
    max_length: usize,
    buffer: String,
    buffer_len: usize,
    has_content: bool,
    open: Vec<OpenTag>,
    carried: Vec<String>,
    // Tags dropped because they could not fit; their close tags are ignored
    skipped: Vec<String>,
    finished: bool,
}

impl<'a> ChunksIterator<'a> {
    pub fn new(html: &'a str, max_length: usize) -> Self {
        Self {
            tokens: tokenize(html).into_iter(),
            pending: None,
            max_length: max_length.max(1),
            buffer: String::new(),
            buffer_len: 0,
            has_content: false,
            open: Vec::new(),
            carried: Vec::new(),
            skipped: Vec::new(),
            finished: false,
        }
    }

    fn closing_len(&self) -> usize {
        self.open.iter().map(|tag| tag.name.len() + 3).sum()
    }

    fn room(&self) -> usize {
        self.max_length
            .saturating_sub(self.buffer_len + self.closing_len())
    }

    fn append(&mut self, s: &str) {
        self.buffer.push_str(s);
        self.buffer_len += char_len(s);
    }

    /// Places a token into the current chunk.
    /// Returns the token (or what is left of it) when the chunk must be flushed first.
    fn step(&mut self, token: Token<'a>) -> Option<Token<'a>> {
        match token {
            Token::Text(text) => self.place_text(text).map(Token::Text),
            Token::Tag(tag) if tag.is_allowed() && tag.kind == TagKind::Open => {
                if self.open_tag(&tag.name, tag.raw) {
                    None
                } else {
                    Some(Token::Tag(tag))
                }
            }
            Token::Tag(tag) if tag.is_allowed() && tag.kind == TagKind::Close => {
                self.close_tag(&tag.name);
                None
            }
            // Foreign and self-closing tags are kept as indivisible pieces
            Token::Tag(tag) => {
                if self.place_atom(tag.raw) {
                    None
                } else {
                    Some(Token::Tag(tag))
                }
            }
        }
    }

    fn place_text(&mut self, mut text: &'a str) -> Option<&'a str> {
        loop {
            let room = self.room();
            if char_len(text) <= room {
                self.append(text);
                self.has_content |= !text.is_empty();
                return None;
            }
            if self.has_content {
                return Some(text);
            }
            if room == 0 {
                self.drop_open_tags();
                continue;
            }

            let cut = split_point(text, room);
            if cut > 0 {
                let (head, tail) = text.split_at(cut);
                self.append(head);
                self.has_content = true;
                return Some(tail);
            }

            // The text starts with an entity longer than the room left
            if !self.buffer.is_empty() {
                self.drop_open_tags();
                continue;
            }
            let entity_len = entity_len_at(text, 0).unwrap_or(text.len());
            log::warn!(
                "Dropping {} which does not fit into a {}-character message",
                &text[..entity_len],
                self.max_length
            );
            text = &text[entity_len..];
        }
    }

    fn place_atom(&mut self, raw: &str) -> bool {
        loop {
            if char_len(raw) <= self.room() {
                self.append(raw);
                self.has_content = true;
                return true;
            }
            if self.has_content {
                return false;
            }
            if !self.buffer.is_empty() {
                self.drop_open_tags();
                continue;
            }
            log::warn!(
                "Dropping {raw} which does not fit into a {}-character message",
                self.max_length
            );
            return true;
        }
    }

    fn open_tag(&mut self, name: &str, raw: &str) -> bool {
        loop {
            let needed = char_len(raw) + name.len() + 3;
            if self.buffer_len + needed + self.closing_len() <= self.max_length {
                self.append(raw);
                self.open.push(OpenTag {
                    name: name.to_string(),
                    markup: raw.to_string(),
                });
                return true;
            }
            if self.has_content {
                return false;
            }
            if !self.buffer.is_empty() {
                self.drop_open_tags();
                continue;
            }
            log::warn!(
                "Dropping {raw} which does not fit into a {}-character message",
                self.max_length
            );
            self.skipped.push(name.to_string());
            return true;
        }
    }

    fn close_tag(&mut self, name: &str) {
        if let Some(pos) = self.open.iter().rposition(|tag| tag.name == name) {
            let closed = self.open.split_off(pos);
            for tag in closed.iter().rev() {
                self.append(&closing_tag(&tag.name));
            }
        } else if let Some(pos) = self.skipped.iter().rposition(|skipped| skipped == name) {
            self.skipped.remove(pos);
        }
    }

    /// Called when the chunk holds nothing but opening tags that leave no room:
    /// the tags are given up for the rest of the document.
    fn drop_open_tags(&mut self) {
        if !self.open.is_empty() {
            log::warn!(
                "Tags {:?} leave no room in a {}-character message, dropping them",
                self.open.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(),
                self.max_length
            );
        }
        self.skipped
            .extend(self.open.drain(..).map(|tag| tag.name));
        self.buffer.clear();
        self.buffer_len = 0;
        self.carried.clear();
    }

    fn flush(&mut self) -> MessageChunk {
        let closing: String = self
            .open
            .iter()
            .rev()
            .map(|tag| closing_tag(&tag.name))
            .collect();
        self.buffer.push_str(&closing);

        let chunk = MessageChunk {
            text: std::mem::take(&mut self.buffer),
            open_tags_at_start: std::mem::take(&mut self.carried),
        };

        self.buffer = self.open.iter().map(|tag| tag.markup.as_str()).collect();
        self.buffer_len = char_len(&self.buffer);
        self.carried = self.open.iter().map(|tag| tag.name.clone()).collect();
        self.has_content = false;

        chunk
    }
}

impl Iterator for ChunksIterator<'_> {
    type Item = MessageChunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let Some(token) = self.pending.take().or_else(|| self.tokens.next()) else {
                self.finished = true;
                if self.has_content {
                    return Some(self.flush());
                }
                return None;
            };

            if let Some(retry) = self.step(token) {
                self.pending = Some(retry);
                return Some(self.flush());
            }
        }
    }
}

/// Byte index to cut `text` after at most `max_chars` characters.
///
/// Zero when an entity starting the text does not fit.
fn split_point(text: &str, max_chars: usize) -> usize {
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(pos, _)| pos);

    if let Some(amp) = text[..cut].rfind('&') {
        let straddles = entity_len_at(text, amp).is_some_and(|len| amp + len > cut);
        if straddles {
            return amp;
        }
    }
    cut
}

/// Splits formatted markup into messages of at most `max_length` characters
pub fn split_long_message(html: &str, max_length: usize) -> Vec<String> {
    ChunksIterator::new(html, max_length)
        .map(|chunk| chunk.text)
        .collect()
}
