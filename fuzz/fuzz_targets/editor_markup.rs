//! Fuzz target for structured editor markup.
//!
//! Builds tag soup out of known tags, attributes and hostile values so the
//! fuzzer spends its time on markup the tokenizer actually recognises.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vellum_sanitizer::tokenizer::{Token, Tokenizer};
use vellum_sanitizer::{DangerousContentDetector, HtmlSanitizer, SanitizerPolicy};

const TAGS: &[&str] = &[
    "p", "a", "img", "span", "div", "b", "table", "td", "script", "style", "svg", "iframe", "x",
];

const ATTRIBUTES: &[&str] = &[
    "href", "src", "style", "class", "title", "onclick", "onerror", "cite", "data-x", "xmlns",
];

const VALUES: &[&str] = &[
    "https://example.com",
    "javascript:alert(1)",
    "java&#x09;script:x",
    "data:text/html,x",
    "data:image/png;base64,AA==",
    "color: red",
    "width: expression(alert(1))",
    "background: url(javascript:x)",
    "\" onmouseover=\"x",
    "&lt;script&gt;",
];

/// One piece of editor markup
#[derive(Debug, Arbitrary)]
enum Piece {
    Open { tag: u8, attributes: Vec<(u8, u8, u8)> },
    Close { tag: u8 },
    Text(String),
    Raw(String),
}

/// Quote style for an attribute value
fn quoted(value: &str, quote: u8) -> String {
    match quote % 3 {
        0 => format!("\"{}\"", value),
        1 => format!("'{}'", value),
        _ => value.to_string(),
    }
}

fn render(pieces: &[Piece]) -> String {
    let mut html = String::new();
    for piece in pieces {
        match piece {
            Piece::Open { tag, attributes } => {
                html.push('<');
                html.push_str(TAGS[*tag as usize % TAGS.len()]);
                for (name, value, quote) in attributes {
                    html.push(' ');
                    html.push_str(ATTRIBUTES[*name as usize % ATTRIBUTES.len()]);
                    html.push('=');
                    html.push_str(&quoted(VALUES[*value as usize % VALUES.len()], *quote));
                }
                html.push('>');
            }
            Piece::Close { tag } => {
                html.push_str("</");
                html.push_str(TAGS[*tag as usize % TAGS.len()]);
                html.push('>');
            }
            Piece::Text(text) => html.push_str(text),
            Piece::Raw(raw) => html.push_str(raw),
        }
    }
    html
}

fuzz_target!(|pieces: Vec<Piece>| {
    let html = render(&pieces);
    let policy = SanitizerPolicy::rich_text();
    let sanitizer = HtmlSanitizer::new(policy.clone());

    let clean = sanitizer.sanitize(&html);
    assert!(DangerousContentDetector::validate(&clean).is_ok(), "dangerous output for {:?}", html);
    assert_eq!(sanitizer.sanitize(&clean), clean, "unstable output for {:?}", html);

    for token in Tokenizer::new(&clean) {
        if let Token::Tag(tag) = token {
            assert!(policy.is_tag_allowed(&tag.name), "tag <{}> escaped the allow-list", tag.name);
            for attribute in &tag.attributes {
                assert!(
                    policy.is_attribute_allowed(&tag.name, attribute.name),
                    "attribute {} escaped the allow-list on <{}>",
                    attribute.name,
                    tag.name
                );
            }
        }
    }
});
