//! # Vellum Sanitizer
//!
//! Allow-list HTML sanitization for content produced by rich-text editors.
//!
//! ## Features
//!
//! - ✅ **Pattern Scrubbing** - Remove scripts, embedded documents, event handlers and dangerous schemes
//! - ✅ **Tag Allow-list** - Only known formatting tags survive
//! - ✅ **Attribute Allow-list** - Per-tag and global attribute tables
//! - ✅ **URL & Style Checks** - Script-capable URLs and CSS injection primitives are dropped
//! - ✅ **Idempotent Output** - Sanitizing twice gives the same result
//! - ✅ **Content Classifier** - Flag dangerous content without modifying it
//!
//! ## Quick Start
//!
//! ```rust
//! use vellum_sanitizer::{contains_dangerous_content, sanitize_html};
//!
//! let dirty = r#"<p onclick="steal()">Hello</p><script>alert('XSS')</script>"#;
//! assert!(contains_dangerous_content(dirty));
//!
//! let clean = sanitize_html(dirty);
//! assert_eq!(clean, "<p>Hello</p>");
//! assert!(!contains_dangerous_content(&clean));
//!
//! // Absent input is empty output
//! assert_eq!(sanitize_html(None), "");
//! ```
//!
//! ## Policies
//!
//! ```rust
//! use vellum_sanitizer::{HtmlSanitizer, SanitizerPolicy};
//!
//! // Strict sanitizer (paragraphs and emphasis only)
//! let strict = HtmlSanitizer::strict();
//! assert_eq!(strict.sanitize("<h1><b>Title</b></h1>"), "<b>Title</b>");
//!
//! // Custom policy
//! let policy = SanitizerPolicy::rich_text()
//!     .deny_tag("img")
//!     .allow_attribute("span", "translate");
//! let sanitizer = HtmlSanitizer::new(policy);
//! assert_eq!(
//!     sanitizer.sanitize(r#"<span translate="no">Vellum</span><img src="a.png">"#),
//!     r#"<span translate="no">Vellum</span>"#
//! );
//! ```
//!
//! ## Pattern Scrubbing Only
//!
//! ```rust
//! use vellum_sanitizer::remove_dangerous_patterns_only;
//!
//! let out = remove_dangerous_patterns_only("<custom>ok</custom><style>a{}</style>");
//! assert_eq!(out, "<custom>ok</custom>");
//! ```
//!
//! ## Threat Detection
//!
//! ```rust
//! use vellum_sanitizer::{DangerousContentDetector, ThreatKind};
//!
//! assert_eq!(
//!     DangerousContentDetector::detect("<img src=x onerror=alert(1)>"),
//!     Some(ThreatKind::EventHandler)
//! );
//! assert!(DangerousContentDetector::validate("<p>Hello World</p>").is_ok());
//! ```

pub mod attributes;
pub mod encoder;
pub mod error;
pub mod limits;
pub mod payload;
pub mod policy;
pub mod sanitizer;
pub mod scrubber;
pub mod tokenizer;
pub mod validator;
pub mod value;

pub use encoder::{EscapedValue, HtmlEncoder, RawValue};
pub use error::{Result, SanitizeError};
pub use limits::{InputLimit, OversizePolicy};
pub use policy::{Profile, SanitizerPolicy};
pub use sanitizer::HtmlSanitizer;
pub use scrubber::{PatternRule, PatternScrubber};
pub use validator::{DangerousContentDetector, ThreatKind};

use once_cell::sync::Lazy;

/// Log target for every record this crate emits.
pub const LOG_TARGET: &str = "vellum::sanitizer";

static DEFAULT_SANITIZER: Lazy<HtmlSanitizer> = Lazy::new(HtmlSanitizer::default);

/// Sanitize editor HTML with the rich-text policy.
///
/// `None` and `""` give `""`. Dangerous input never comes back unchanged;
/// in the worst case the result is empty.
pub fn sanitize_html<'a>(html: impl Into<Option<&'a str>>) -> String {
    match html.into() {
        Some(html) => DEFAULT_SANITIZER.sanitize(html),
        None => String::new(),
    }
}

/// True when `html` contains any construct the sanitizer would remove as
/// dangerous. Read-only.
pub fn contains_dangerous_content(html: &str) -> bool {
    DangerousContentDetector::contains_dangerous(html)
}

/// Pattern scrubbing without tag or attribute filtering.
pub fn remove_dangerous_patterns_only(html: &str) -> String {
    DEFAULT_SANITIZER.scrub(html)
}
