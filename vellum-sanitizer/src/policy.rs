//! Allow-list configuration: which tags survive and which attributes each
//! tag may carry.

use crate::scrubber::REMOVED_ELEMENTS;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use vellum_log::warn;

/// Key of the attribute table entry that applies to every tag.
pub const GLOBAL: &str = "*";

const RICH_TEXT_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "col", "colgroup", "dd",
    "del", "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6",
    "hr", "i", "img", "ins", "kbd", "li", "mark", "ol", "p", "pre", "q", "s", "samp", "small",
    "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "u", "ul",
];

const RICH_TEXT_ATTRIBUTES: &[(&str, &[&str])] = &[
    (GLOBAL, &["class", "dir", "id", "lang", "style", "title"]),
    ("a", &["href", "name", "rel", "target"]),
    ("img", &["alt", "height", "src", "width"]),
    ("blockquote", &["cite"]),
    ("q", &["cite"]),
    ("table", &["border", "cellpadding", "cellspacing", "width"]),
    ("td", &["align", "colspan", "rowspan"]),
    ("th", &["align", "colspan", "rowspan", "scope"]),
    ("col", &["span", "width"]),
    ("colgroup", &["span", "width"]),
    ("ol", &["reversed", "start", "type"]),
    ("ul", &["type"]),
    ("li", &["value"]),
];

const STRICT_TAGS: &[&str] = &["b", "br", "em", "i", "p", "strong", "u"];

/// Named built-in policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Full editor output: formatting, headings, lists, links, images, tables
    #[default]
    RichText,
    /// Paragraphs and inline emphasis, no attributes
    Strict,
    /// No markup at all
    PlainText,
}

/// How an attribute value is checked before it is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Navigable or fetchable URL; scheme checked
    Url,
    /// Inline CSS; injection primitives stripped
    Style,
    Plain,
}

/// Immutable allow-list handed to a sanitizer at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerPolicy {
    allowed_tags: BTreeSet<String>,
    allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    url_attributes: BTreeSet<String>,
    style_attributes: BTreeSet<String>,
}

impl SanitizerPolicy {
    /// Policy for WYSIWYG editor output.
    pub fn rich_text() -> Self {
        let mut policy = Self::empty();
        for tag in RICH_TEXT_TAGS {
            policy = policy.allow_tag(tag);
        }
        for (tag, attributes) in RICH_TEXT_ATTRIBUTES {
            for attribute in *attributes {
                policy = policy.allow_attribute(tag, attribute);
            }
        }
        policy
    }

    /// Inline emphasis and paragraphs only.
    pub fn strict() -> Self {
        STRICT_TAGS
            .iter()
            .fold(Self::empty(), |policy, tag| policy.allow_tag(tag))
    }

    /// Every tag is removed; text survives.
    pub fn plain_text() -> Self {
        Self::empty()
    }

    pub fn from_profile(profile: Profile) -> Self {
        match profile {
            Profile::RichText => Self::rich_text(),
            Profile::Strict => Self::strict(),
            Profile::PlainText => Self::plain_text(),
        }
    }

    fn empty() -> Self {
        Self {
            allowed_tags: BTreeSet::new(),
            allowed_attributes: BTreeMap::new(),
            url_attributes: ["cite", "href", "src"].into_iter().map(String::from).collect(),
            style_attributes: ["style"].into_iter().map(String::from).collect(),
        }
    }

    /// Allow a tag. Elements the scrubber removes wholesale cannot be allowed.
    pub fn allow_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        if REMOVED_ELEMENTS.contains(&tag.as_str()) {
            warn!(target: crate::LOG_TARGET, "refusing to allow dangerous element <{}>", tag);
            return self;
        }
        if !tag.is_empty() {
            self.allowed_tags.insert(tag);
        }
        self
    }

    /// Remove a tag and its tag-specific attributes.
    pub fn deny_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        self.allowed_tags.remove(&tag);
        self.allowed_attributes.remove(&tag);
        self
    }

    /// Allow `attribute` on `tag`, or on every tag when `tag` is [`GLOBAL`].
    /// Event-handler names (`on*`) are refused.
    pub fn allow_attribute(mut self, tag: &str, attribute: &str) -> Self {
        let attribute = attribute.trim().to_ascii_lowercase();
        if attribute.is_empty() || attribute.starts_with("on") {
            warn!(target: crate::LOG_TARGET, "refusing to allow attribute {:?}", attribute);
            return self;
        }
        self.allowed_attributes
            .entry(tag.trim().to_ascii_lowercase())
            .or_default()
            .insert(attribute);
        self
    }

    /// Treat `attribute` as URL-bearing (scheme checked).
    pub fn with_url_attribute(mut self, attribute: &str) -> Self {
        self.url_attributes.insert(attribute.trim().to_ascii_lowercase());
        self
    }

    /// Case-insensitive tag lookup.
    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        if tag.bytes().any(|b| b.is_ascii_uppercase()) {
            self.allowed_tags.contains(&tag.to_ascii_lowercase())
        } else {
            self.allowed_tags.contains(tag)
        }
    }

    /// Tag-specific entry united with the global entry. Both names must
    /// already be lower-case.
    pub fn is_attribute_allowed(&self, tag: &str, attribute: &str) -> bool {
        [tag, GLOBAL].iter().any(|key| {
            self.allowed_attributes
                .get(*key)
                .is_some_and(|set| set.contains(attribute))
        })
    }

    pub fn value_kind(&self, attribute: &str) -> ValueKind {
        if self.url_attributes.contains(attribute) {
            ValueKind::Url
        } else if self.style_attributes.contains(attribute) {
            ValueKind::Style
        } else {
            ValueKind::Plain
        }
    }

    pub fn allowed_tags(&self) -> impl Iterator<Item = &str> {
        self.allowed_tags.iter().map(String::as_str)
    }

    /// Attributes allowed on `tag`, global ones included.
    pub fn allowed_attributes_for(&self, tag: &str) -> BTreeSet<&str> {
        [tag, GLOBAL]
            .iter()
            .filter_map(|key| self.allowed_attributes.get(*key))
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        Self::rich_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text_tags() {
        let policy = SanitizerPolicy::rich_text();
        for tag in ["p", "a", "img", "table", "blockquote", "pre", "code", "h3", "ul", "li"] {
            assert!(policy.is_tag_allowed(tag), "{tag} should be allowed");
        }
        assert!(policy.is_tag_allowed("STRONG"));
        assert!(!policy.is_tag_allowed("script"));
        assert!(!policy.is_tag_allowed("form"));
    }

    #[test]
    fn test_attribute_lookup_is_tag_specific_plus_global() {
        let policy = SanitizerPolicy::rich_text();
        assert!(policy.is_attribute_allowed("a", "href"));
        assert!(policy.is_attribute_allowed("a", "class"));
        assert!(policy.is_attribute_allowed("p", "style"));
        assert!(!policy.is_attribute_allowed("p", "href"));
        assert!(!policy.is_attribute_allowed("img", "onerror"));
    }

    #[test]
    fn test_dangerous_elements_cannot_be_allowed() {
        let policy = SanitizerPolicy::plain_text()
            .allow_tag("script")
            .allow_tag("SVG")
            .allow_tag("iframe");
        assert_eq!(policy.allowed_tags().count(), 0);
    }

    #[test]
    fn test_event_handlers_cannot_be_allowed() {
        let policy = SanitizerPolicy::strict().allow_attribute("p", "onclick");
        assert!(!policy.is_attribute_allowed("p", "onclick"));
    }

    #[test]
    fn test_deny_tag_removes_its_attributes() {
        let policy = SanitizerPolicy::rich_text().deny_tag("a");
        assert!(!policy.is_tag_allowed("a"));
        assert!(!policy.is_attribute_allowed("a", "href"));
        assert!(policy.is_attribute_allowed("a", "title"));
    }

    #[test]
    fn test_value_kinds() {
        let policy = SanitizerPolicy::rich_text().with_url_attribute("poster");
        assert_eq!(policy.value_kind("href"), ValueKind::Url);
        assert_eq!(policy.value_kind("poster"), ValueKind::Url);
        assert_eq!(policy.value_kind("style"), ValueKind::Style);
        assert_eq!(policy.value_kind("alt"), ValueKind::Plain);
    }

    #[test]
    fn test_profiles() {
        assert_eq!(SanitizerPolicy::from_profile(Profile::Strict), SanitizerPolicy::strict());
        assert_eq!(SanitizerPolicy::plain_text().allowed_tags().count(), 0);
        assert!(SanitizerPolicy::strict().allowed_attributes_for("p").is_empty());
        assert!(SanitizerPolicy::rich_text().allowed_attributes_for("img").contains("src"));
    }

    #[test]
    fn test_profile_serde_names() {
        let profile: Profile = serde_json::from_str(r#""plain_text""#).unwrap();
        assert_eq!(profile, Profile::PlainText);
        assert_eq!(serde_json::to_string(&Profile::RichText).unwrap(), r#""rich_text""#);
    }
}
