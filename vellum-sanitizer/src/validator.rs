use crate::error::{Result, SanitizeError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Dangerous content classifier.
///
/// A read-only check used to flag content for review or to verify sanitizer
/// output. The patterns are compiled here, apart from the scrubber's rule
/// list, and never influence sanitization.
pub struct DangerousContentDetector;

/// Category of the first dangerous construct found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatKind {
    DangerousElement,
    EventHandler,
    ScriptScheme,
    DataUrl,
    CssExpression,
    CssBehavior,
    CssBinding,
}

impl fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThreatKind::DangerousElement => "Dangerous element",
            ThreatKind::EventHandler => "Event handler injection",
            ThreatKind::ScriptScheme => "Script protocol",
            ThreatKind::DataUrl => "Data URL injection",
            ThreatKind::CssExpression => "CSS expression",
            ThreatKind::CssBehavior => "CSS behavior",
            ThreatKind::CssBinding => "CSS binding",
        };
        f.write_str(label)
    }
}

static ELEMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)</?(?:",
        // scripting and embedded documents
        r"script|style|iframe|object|embed|applet|template|svg|math",
        // forms
        r"|form|input|button|textarea|select|keygen|isindex",
        // document metadata
        r"|meta|link|base",
        // media
        r"|audio|video|source|track",
        // legacy
        r"|frameset|frame|marquee|bgsound|blink|layer",
        r")\b",
    ))
    .unwrap()
});

static EVENT_HANDLER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|[\s/"'=])on\w+\s*="#).unwrap()
});

static SCRIPT_SCHEME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:java|vb)script\s*:").unwrap()
});

static DATA_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdata\s*:(\s*image/)?").unwrap()
});

static EXPRESSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)expression\s*\(").unwrap()
});

static BEHAVIOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)behavior\s*:").unwrap()
});

static BINDING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)-moz-binding\s*:").unwrap()
});

impl DangerousContentDetector {
    /// Check if text contains any dangerous construct
    pub fn contains_dangerous(text: &str) -> bool {
        Self::detect(text).is_some()
    }

    /// Validate text and return error if dangerous content is detected
    pub fn validate(text: &str) -> Result<()> {
        match Self::detect(text) {
            Some(kind) => Err(SanitizeError::DangerousContent(kind)),
            None => Ok(()),
        }
    }

    /// Detect the kind of dangerous construct, checked in a fixed order
    pub fn detect(text: &str) -> Option<ThreatKind> {
        if ELEMENT_PATTERN.is_match(text) {
            return Some(ThreatKind::DangerousElement);
        }
        if EVENT_HANDLER_PATTERN.is_match(text) {
            return Some(ThreatKind::EventHandler);
        }
        if SCRIPT_SCHEME_PATTERN.is_match(text) {
            return Some(ThreatKind::ScriptScheme);
        }
        // `data:image/` is the one allowed form
        if DATA_URL_PATTERN
            .captures_iter(text)
            .any(|caps| caps.get(1).is_none())
        {
            return Some(ThreatKind::DataUrl);
        }
        if EXPRESSION_PATTERN.is_match(text) {
            return Some(ThreatKind::CssExpression);
        }
        if BEHAVIOR_PATTERN.is_match(text) {
            return Some(ThreatKind::CssBehavior);
        }
        if BINDING_PATTERN.is_match(text) {
            return Some(ThreatKind::CssBinding);
        }
        None
    }
}
