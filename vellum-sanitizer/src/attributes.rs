//! Attribute lexing and allow-list filtering.
//!
//! [`lex_attributes`] reads the attribute section of a start tag up to and
//! including its closing `>`, honouring quotes the way user agents do, so a
//! `>` inside a quoted value never ends the tag. [`AttributeFilter`] then
//! decides which attributes survive and renders them.

use crate::encoder::RawValue;
use crate::policy::{SanitizerPolicy, ValueKind};
use crate::value::{is_safe_url, sanitize_style};
use std::collections::HashSet;

/// One attribute as authored: name and undecoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePair<'a> {
    pub name: &'a str,
    /// `None` for a valueless attribute such as `<td nowrap>`
    pub value: Option<&'a str>,
}

/// Result of lexing a tag's attribute section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedAttributes<'a> {
    pub pairs: Vec<AttributePair<'a>>,
    pub self_closing: bool,
    /// Everything between the tag name and the closing `>`
    pub raw: &'a str,
    /// Bytes consumed, closing `>` included
    pub consumed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
}

pub(crate) fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// Lex the attributes that follow a tag name.
///
/// Returns `None` when input ends before the tag is closed.
pub fn lex_attributes(input: &str) -> Option<LexedAttributes<'_>> {
    let bytes = input.as_bytes();
    let mut state = State::BeforeAttributeName;
    let mut pairs = Vec::new();
    let mut name_start = 0;
    let mut name_end = 0;
    let mut value_start = 0;
    let mut i = 0;

    // Slices are only cut at ASCII structural bytes, so they stay on char
    // boundaries even though the scan is bytewise.
    let finish = move |pairs, self_closing: bool, gt: usize| LexedAttributes {
        pairs,
        self_closing,
        raw: &input[..gt],
        consumed: gt + 1,
    };

    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::BeforeAttributeName => match b {
                b if is_html_whitespace(b) => i += 1,
                b'/' => {
                    state = State::SelfClosingStartTag;
                    i += 1;
                }
                b'>' => return Some(finish(pairs, false, i)),
                _ => {
                    name_start = i;
                    state = State::AttributeName;
                    i += 1;
                }
            },
            State::AttributeName => match b {
                b if is_html_whitespace(b) || b == b'/' || b == b'>' => {
                    name_end = i;
                    state = State::AfterAttributeName;
                }
                b'=' => {
                    name_end = i;
                    state = State::BeforeAttributeValue;
                    i += 1;
                }
                _ => i += 1,
            },
            State::AfterAttributeName => match b {
                b if is_html_whitespace(b) => i += 1,
                b'=' => {
                    state = State::BeforeAttributeValue;
                    i += 1;
                }
                b'/' => {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: None,
                    });
                    state = State::SelfClosingStartTag;
                    i += 1;
                }
                b'>' => {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: None,
                    });
                    return Some(finish(pairs, false, i));
                }
                _ => {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: None,
                    });
                    name_start = i;
                    state = State::AttributeName;
                    i += 1;
                }
            },
            State::BeforeAttributeValue => match b {
                b if is_html_whitespace(b) => i += 1,
                b'"' => {
                    value_start = i + 1;
                    state = State::AttributeValueDoubleQuoted;
                    i += 1;
                }
                b'\'' => {
                    value_start = i + 1;
                    state = State::AttributeValueSingleQuoted;
                    i += 1;
                }
                b'>' => {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: Some(""),
                    });
                    return Some(finish(pairs, false, i));
                }
                _ => {
                    value_start = i;
                    state = State::AttributeValueUnquoted;
                }
            },
            State::AttributeValueDoubleQuoted | State::AttributeValueSingleQuoted => {
                let quote = if state == State::AttributeValueDoubleQuoted {
                    b'"'
                } else {
                    b'\''
                };
                if b == quote {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: Some(&input[value_start..i]),
                    });
                    state = State::AfterAttributeValueQuoted;
                }
                i += 1;
            }
            State::AttributeValueUnquoted => match b {
                b if is_html_whitespace(b) => {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: Some(&input[value_start..i]),
                    });
                    state = State::BeforeAttributeName;
                    i += 1;
                }
                b'>' => {
                    pairs.push(AttributePair {
                        name: &input[name_start..name_end],
                        value: Some(&input[value_start..i]),
                    });
                    return Some(finish(pairs, false, i));
                }
                _ => i += 1,
            },
            State::AfterAttributeValueQuoted => match b {
                b if is_html_whitespace(b) => {
                    state = State::BeforeAttributeName;
                    i += 1;
                }
                b'/' => {
                    state = State::SelfClosingStartTag;
                    i += 1;
                }
                b'>' => return Some(finish(pairs, false, i)),
                _ => state = State::BeforeAttributeName,
            },
            State::SelfClosingStartTag => match b {
                b'>' => return Some(finish(pairs, true, i)),
                _ => state = State::BeforeAttributeName,
            },
        }
    }

    None
}

/// Applies a policy's attribute table and value checks to one tag.
#[derive(Debug, Clone, Copy)]
pub struct AttributeFilter<'p> {
    policy: &'p SanitizerPolicy,
}

impl<'p> AttributeFilter<'p> {
    pub fn new(policy: &'p SanitizerPolicy) -> Self {
        Self { policy }
    }

    /// Render the surviving attributes of `tag` as ` name="value"` pairs in
    /// input order. `tag` must be lower-case.
    ///
    /// The first occurrence of a name is the one user agents honour, so later
    /// duplicates are ignored even when the first is dropped.
    pub fn render(&self, tag: &str, pairs: &[AttributePair<'_>]) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();

        for pair in pairs {
            let name = pair.name.to_ascii_lowercase();
            if !seen.insert(name.clone()) {
                continue;
            }
            if !self.policy.is_attribute_allowed(tag, &name) {
                continue;
            }

            let Some(markup) = pair.value else {
                out.push(' ');
                out.push_str(&name);
                continue;
            };

            let mut value = RawValue::from_markup(markup);
            match self.policy.value_kind(&name) {
                ValueKind::Url if !is_safe_url(&value) => continue,
                ValueKind::Style => match sanitize_style(value.as_str()) {
                    Some(cleaned) => value = value.map(|_| cleaned),
                    None => continue,
                },
                _ => {}
            }

            out.push(' ');
            out.push_str(&name);
            out.push_str("=\"");
            out.push_str(value.escape().as_str());
            out.push('"');
        }

        out
    }
}
