use crate::attributes::AttributeFilter;
use crate::encoder::HtmlEncoder;
use crate::error::Result;
use crate::limits::InputLimit;
use crate::policy::{Profile, SanitizerPolicy};
use crate::scrubber::PatternScrubber;
use crate::tokenizer::{Token, Tokenizer};
use std::sync::Arc;
use vellum_log::{debug, warn};

/// Passes allowed before the sanitizer gives up and returns nothing.
const MAX_PASSES: usize = 8;

/// Allow-list HTML sanitizer for editor content
///
/// Each pass scrubs dangerous patterns, tokenizes what is left, drops tags and
/// attributes the policy does not allow and re-emits the rest. Passes repeat
/// until the output is a fixed point, so sanitizing sanitized output never
/// changes it.
#[derive(Debug, Clone)]
pub struct HtmlSanitizer {
    policy: Arc<SanitizerPolicy>,
    scrubber: PatternScrubber,
    limit: Option<InputLimit>,
}

impl HtmlSanitizer {
    /// Create a sanitizer for the given policy
    pub fn new(policy: SanitizerPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            scrubber: PatternScrubber::standard(),
            limit: None,
        }
    }

    /// Create a sanitizer for a built-in profile
    pub fn from_profile(profile: Profile) -> Self {
        Self::new(SanitizerPolicy::from_profile(profile))
    }

    /// Create a strict sanitizer (paragraphs and emphasis only)
    pub fn strict() -> Self {
        Self::new(SanitizerPolicy::strict())
    }

    /// Create a sanitizer that strips every tag
    pub fn plain_text() -> Self {
        Self::new(SanitizerPolicy::plain_text())
    }

    /// Replace the pattern scrubber
    pub fn with_scrubber(mut self, scrubber: PatternScrubber) -> Self {
        self.scrubber = scrubber;
        self
    }

    /// Bound the input size
    pub fn with_input_limit(mut self, limit: InputLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn policy(&self) -> &SanitizerPolicy {
        &self.policy
    }

    pub fn input_limit(&self) -> Option<InputLimit> {
        self.limit
    }

    /// Pattern scrubbing alone, without tag or attribute filtering
    pub fn scrub(&self, html: &str) -> String {
        self.scrubber.scrub(html)
    }

    /// Sanitize HTML. Never fails: input the sanitizer cannot handle yields
    /// an empty string, never the raw input.
    pub fn sanitize(&self, html: &str) -> String {
        self.try_sanitize(html).unwrap_or_default()
    }

    /// Sanitize HTML, reporting input over the configured limit
    pub fn try_sanitize(&self, html: &str) -> Result<String> {
        let html = match &self.limit {
            Some(limit) => limit.apply(html)?,
            None => html,
        };
        Ok(self.sanitize_to_fixed_point(html))
    }

    fn sanitize_to_fixed_point(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }

        let mut current = html.to_string();
        for pass in 1..=MAX_PASSES {
            let scrubbed = self.scrubber.scrub(&current);
            let filtered = self.filter(&scrubbed);
            if scrubbed == current && filtered == current {
                debug!(
                    target: crate::LOG_TARGET,
                    "sanitized {} -> {} bytes in {} pass(es)",
                    html.len(),
                    current.len(),
                    pass
                );
                return current;
            }
            current = filtered;
        }

        warn!(
            target: crate::LOG_TARGET,
            "{} byte input did not settle after {} passes, discarding it",
            html.len(),
            MAX_PASSES
        );
        String::new()
    }

    /// One tokenize, filter and emit pass over scrubbed markup
    fn filter(&self, scrubbed: &str) -> String {
        let attributes = AttributeFilter::new(&self.policy);
        let mut out = String::with_capacity(scrubbed.len());

        for token in Tokenizer::new(scrubbed) {
            match token {
                Token::Text(text) => out.push_str(&HtmlEncoder::encode_text(text)),
                Token::Tag(tag) if self.policy.is_tag_allowed(&tag.name) => {
                    if tag.is_closing {
                        out.push_str("</");
                        out.push_str(&tag.name);
                        out.push('>');
                    } else {
                        out.push('<');
                        out.push_str(&tag.name);
                        out.push_str(&attributes.render(&tag.name, &tag.attributes));
                        out.push_str(if tag.is_self_closing { " />" } else { ">" });
                    }
                }
                Token::Tag(_) | Token::Discarded => {}
            }
        }

        out
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new(SanitizerPolicy::default())
    }
}
