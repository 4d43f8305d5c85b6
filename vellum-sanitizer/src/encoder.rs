//! Entity encoding and the escape-state types for attribute values.
//!
//! Attribute values move through exactly two states. [`RawValue`] holds the
//! string a user agent will see after entity decoding; URL and style checks
//! run on it. [`EscapedValue`] is the markup form written to output. The only
//! way to get an `EscapedValue` is [`RawValue::escape`], which consumes the raw
//! value, so a value can never be escaped twice.

use std::fmt;

/// HTML encoding utilities
pub struct HtmlEncoder;

impl HtmlEncoder {
    /// Encode text content. Entities already present are left alone so
    /// editor output such as `&nbsp;` survives.
    pub fn encode_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Encode a value for a double-quoted attribute.
    pub fn encode_attribute(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Decode the four entities [`encode_attribute`](Self::encode_attribute) produces.
    pub fn decode_attribute(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&") // Must be last
    }
}

/// Attribute value as a user agent sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(String);

impl RawValue {
    /// Interpret an authored attribute value.
    pub fn from_markup(markup: &str) -> Self {
        Self(HtmlEncoder::decode_attribute(markup))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replace the content, e.g. after style cleaning.
    pub fn map(self, f: impl FnOnce(String) -> String) -> Self {
        Self(f(self.0))
    }

    pub fn escape(self) -> EscapedValue {
        EscapedValue(HtmlEncoder::encode_attribute(&self.0))
    }
}

/// Attribute value safe to place between double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedValue(String);

impl EscapedValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EscapedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text_leaves_entities() {
        assert_eq!(
            HtmlEncoder::encode_text("a < b &amp; c > d&nbsp;"),
            "a &lt; b &amp; c &gt; d&nbsp;"
        );
    }

    #[test]
    fn test_encode_attribute() {
        let input = r#"Hello" onclick="alert('XSS')"#;
        let output = HtmlEncoder::encode_attribute(input);

        assert!(output.contains("&quot;"));
        assert!(!output.contains('"'));
        assert!(output.contains('\''));
    }

    #[test]
    fn test_decode_attribute() {
        let input = "&lt;b&gt; &quot;x&quot; &amp;amp;";
        assert_eq!(HtmlEncoder::decode_attribute(input), r#"<b> "x" &amp;"#);
    }

    #[test]
    fn test_other_entities_become_literal() {
        let escaped = RawValue::from_markup("&#106;avascript:").escape();
        assert_eq!(escaped.as_str(), "&amp;#106;avascript:");
    }

    #[test]
    fn test_escape_is_stable_under_reparse() {
        for markup in ["a&b", "&amp;lt;", "x &quot;y&quot;", "&lt;&gt;", "&amp;amp;"] {
            let once = RawValue::from_markup(markup).escape();
            let twice = RawValue::from_markup(once.as_str()).escape();
            assert_eq!(once, twice, "unstable for {markup}");
        }
    }

    #[test]
    fn test_map_keeps_raw_state() {
        let value = RawValue::from_markup("color: red").map(|s| s.to_uppercase());
        assert_eq!(value.as_str(), "COLOR: RED");
    }
}
