//! Checks for attribute values that carry a URL or inline CSS.

use crate::encoder::RawValue;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CSS_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?(?:\*/|$)").unwrap());

static CSS_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)expression\s*\([^;]*").unwrap());

static CSS_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)url\s*\(([^)]*)\)?").unwrap());

static CSS_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)@import[^;]*;?").unwrap());

static CSS_BEHAVIOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)behavior\s*:[^;]*;?").unwrap());

static CSS_BINDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)-moz-binding\s*:[^;]*;?").unwrap());

/// True when a URL would run script or load a non-image `data:` document.
///
/// Tab, line feed and carriage return are ignored anywhere in the value and
/// leading control characters and spaces are skipped, the way browsers read a
/// scheme. Matching is case-insensitive.
pub fn has_unsafe_scheme(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .skip_while(|c| *c <= ' ')
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();

    normalized.starts_with("javascript:")
        || normalized.starts_with("vbscript:")
        || (normalized.starts_with("data:") && !normalized.starts_with("data:image/"))
}

/// URL attribute check on the decoded value.
pub fn is_safe_url(value: &RawValue) -> bool {
    !has_unsafe_scheme(value.as_str())
}

/// Strip CSS injection primitives from an inline style.
///
/// Returns `None` when the attribute should be dropped: the value uses CSS
/// escapes, which could spell any of the primitives, or nothing is left once
/// they are gone. Declarations that survive are kept verbatim.
pub fn sanitize_style(style: &str) -> Option<String> {
    let mut current = CSS_COMMENT.replace_all(style, "").into_owned();
    if current.contains('\\') {
        return None;
    }

    loop {
        let before = current.len();
        current = CSS_EXPRESSION.replace_all(&current, "").into_owned();
        current = CSS_URL
            .replace_all(&current, |caps: &Captures<'_>| {
                let target = caps[1].trim().trim_matches(|c| c == '"' || c == '\'');
                if has_unsafe_scheme(target) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        current = CSS_IMPORT.replace_all(&current, "").into_owned();
        current = CSS_BEHAVIOR.replace_all(&current, "").into_owned();
        current = CSS_BINDING.replace_all(&current, "").into_owned();
        if current.len() == before {
            break;
        }
    }

    if current.trim().is_empty() {
        None
    } else {
        Some(current)
    }
}
