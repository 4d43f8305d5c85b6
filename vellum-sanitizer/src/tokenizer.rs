//! Finite-state tokenizer for scrubbed markup.
//!
//! The tokenizer only has to be good enough for a closed allow-list: it
//! recognises start and end tags, hands attribute sections to
//! [`lex_attributes`], and swallows comments, declarations and processing
//! instructions. Anything that cannot be closed before end of input is
//! swallowed through end of input rather than passed on as text.

use crate::attributes::{AttributePair, is_html_whitespace, lex_attributes};

/// One unit of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Character data up to the next `<` that could open markup
    Text(&'a str),
    Tag(TagToken<'a>),
    /// Comment, declaration, processing instruction, stray end tag or an
    /// unterminated construct
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'a> {
    /// ASCII lower-cased tag name
    pub name: String,
    pub is_closing: bool,
    pub is_self_closing: bool,
    /// Attribute section as authored
    pub raw_attributes: &'a str,
    /// Always empty for end tags
    pub attributes: Vec<AttributePair<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    TagOpen,
    EndTagOpen,
    TagName,
    MarkupDeclarationOpen,
    Comment,
    BogusComment,
}

/// Iterator over the tokens of a string.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn discard_rest(&mut self) -> Token<'a> {
        self.pos = self.input.len();
        Token::Discarded
    }

    fn discard_through(&mut self, end: usize) -> Token<'a> {
        self.pos = end;
        Token::Discarded
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let mut state = State::Data;
        let mut i = start;
        let mut is_closing = false;

        loop {
            match state {
                State::Data => {
                    if bytes[i] == b'<' {
                        state = State::TagOpen;
                        i += 1;
                    } else {
                        let end = input[i..].find('<').map_or(bytes.len(), |n| i + n);
                        self.pos = end;
                        return Some(Token::Text(&input[start..end]));
                    }
                }
                State::TagOpen => match bytes.get(i) {
                    Some(b) if b.is_ascii_alphabetic() => state = State::TagName,
                    Some(b'/') => {
                        state = State::EndTagOpen;
                        i += 1;
                    }
                    Some(b'!') => {
                        state = State::MarkupDeclarationOpen;
                        i += 1;
                    }
                    Some(b'?') => state = State::BogusComment,
                    // A `<` that cannot open markup is text
                    _ => {
                        self.pos = i;
                        return Some(Token::Text(&input[start..i]));
                    }
                },
                State::EndTagOpen => match bytes.get(i) {
                    Some(b) if b.is_ascii_alphabetic() => {
                        is_closing = true;
                        state = State::TagName;
                    }
                    Some(b'>') => return Some(self.discard_through(i + 1)),
                    Some(_) => state = State::BogusComment,
                    None => {
                        self.pos = i;
                        return Some(Token::Text(&input[start..i]));
                    }
                },
                State::TagName => {
                    let name_end = bytes[i..]
                        .iter()
                        .position(|&b| is_html_whitespace(b) || b == b'/' || b == b'>')
                        .map_or(bytes.len(), |n| i + n);
                    let Some(lexed) = lex_attributes(&input[name_end..]) else {
                        return Some(self.discard_rest());
                    };
                    self.pos = name_end + lexed.consumed;
                    return Some(Token::Tag(TagToken {
                        name: input[i..name_end].to_ascii_lowercase(),
                        is_closing,
                        is_self_closing: lexed.self_closing && !is_closing,
                        raw_attributes: lexed.raw,
                        attributes: if is_closing { Vec::new() } else { lexed.pairs },
                    }));
                }
                State::MarkupDeclarationOpen => {
                    if input[i..].starts_with("--") {
                        state = State::Comment;
                        i += 2;
                    } else {
                        // Doctype, CDATA and anything else up to the next `>`
                        state = State::BogusComment;
                    }
                }
                State::Comment => {
                    let rest = &input[i..];
                    // `<!-->` and `<!--->` are complete, empty comments
                    let end = if rest.starts_with('>') {
                        Some(1)
                    } else if rest.starts_with("->") {
                        Some(2)
                    } else {
                        rest.find("-->").map(|n| n + 3)
                    };
                    return Some(match end {
                        Some(n) => self.discard_through(i + n),
                        None => self.discard_rest(),
                    });
                }
                State::BogusComment => {
                    return Some(match input[i..].find('>') {
                        Some(n) => self.discard_through(i + n + 1),
                        None => self.discard_rest(),
                    });
                }
            }
        }
    }
}
