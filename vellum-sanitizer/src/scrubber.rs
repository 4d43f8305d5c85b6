//! Pattern scrubber: removes whole dangerous constructs from raw markup
//! before any tokenizing happens.
//!
//! The rule list is applied in order, and the whole list is re-applied until
//! a round changes nothing. Text joined together by one removal (for example
//! `java<script></script>script:`) is caught on the next round. Input that
//! keeps changing after [`MAX_ROUNDS`] rounds is nested on purpose and is
//! dropped whole, which keeps the cost linear in the input length.

use crate::value::has_unsafe_scheme;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::Arc;
use vellum_log::{debug, warn};

/// Rounds over the rule list before scrubbing gives up on the input.
pub const MAX_ROUNDS: usize = 8;

/// Elements removed together with their content, in paired, self-closing and
/// unterminated forms.
pub const REMOVED_ELEMENTS: &[&str] = &[
    "script", "style", "svg", "math", "iframe", "object", "embed", "form", "input", "button",
    "textarea", "select", "meta", "link", "base", "template", "audio", "video", "source", "track",
    "applet", "frameset", "frame", "marquee", "bgsound", "blink", "layer", "keygen", "isindex",
];

/// Void elements have no closing tag, so only the lone-tag rule applies.
const VOID_ELEMENTS: &[&str] = &[
    "embed", "input", "meta", "link", "base", "source", "track", "frame", "bgsound", "keygen",
    "isindex",
];

#[derive(Clone, Copy)]
enum Rewrite {
    /// Drop the whole match
    Remove,
    /// Keep capture group 1, the separator the match started on
    KeepSeparator,
    /// Drop the match only when the predicate holds
    RemoveIf(fn(&Captures<'_>) -> bool),
    /// Rewrite the match in place
    Replace(fn(&str) -> Cow<'_, str>),
}

impl std::fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rewrite::Remove => f.write_str("Remove"),
            Rewrite::KeepSeparator => f.write_str("KeepSeparator"),
            Rewrite::RemoveIf(_) => f.write_str("RemoveIf(..)"),
            Rewrite::Replace(_) => f.write_str("Replace(..)"),
        }
    }
}

/// One entry of the ordered dangerous-pattern list.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    regex: Regex,
    rewrite: Rewrite,
}

impl PatternRule {
    /// Rule that deletes every match of `pattern`.
    pub fn removal(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
            rewrite: Rewrite::Remove,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &str) -> (String, usize) {
        let mut hits = 0;
        let output = self.regex.replace_all(input, |caps: &Captures<'_>| match self.rewrite {
            Rewrite::Remove => {
                hits += 1;
                String::new()
            }
            Rewrite::KeepSeparator => {
                hits += 1;
                caps.get(1).map_or("", |m| m.as_str()).to_string()
            }
            Rewrite::RemoveIf(predicate) => {
                if predicate(caps) {
                    hits += 1;
                    String::new()
                } else {
                    caps[0].to_string()
                }
            }
            Rewrite::Replace(rewrite) => {
                let rewritten = rewrite(&caps[0]);
                if rewritten != &caps[0] {
                    hits += 1;
                }
                rewritten.into_owned()
            }
        });
        (output.into_owned(), hits)
    }
}

fn builtin(name: &str, pattern: &str, rewrite: Rewrite) -> PatternRule {
    PatternRule {
        name: name.to_string(),
        regex: Regex::new(pattern).unwrap(),
        rewrite,
    }
}

static ATTRIBUTE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[a-z][\w:.-]*\s*=\s*(?:"([^"]*)"?|'([^']*)'?|([^\s"'>]+))"#).unwrap()
});

/// Drop every `name=value` pair of a start tag whose value starts with a
/// script-capable scheme.
fn strip_unsafe_url_attributes(tag: &str) -> Cow<'_, str> {
    ATTRIBUTE_PAIR.replace_all(tag, |caps: &Captures<'_>| {
        let unsafe_value = (1..=3)
            .find_map(|group| caps.get(group))
            .is_some_and(|value| has_unsafe_scheme(value.as_str()));
        if unsafe_value {
            String::new()
        } else {
            caps[0].to_string()
        }
    })
}

fn non_image_data_url(caps: &Captures<'_>) -> bool {
    caps.get(1).is_none()
}

static STANDARD_RULES: Lazy<Arc<[PatternRule]>> = Lazy::new(|| {
    let mut rules = Vec::new();

    // Paired elements first so their content goes with them
    for tag in REMOVED_ELEMENTS.iter().filter(|tag| !VOID_ELEMENTS.contains(tag)) {
        rules.push(builtin(
            &format!("paired <{}>", tag),
            &format!(r"(?is)<{0}\b[^>]*>.*?</{0}\b[^>]*>", tag),
            Rewrite::Remove,
        ));
    }
    rules.push(builtin(
        "lone dangerous tag",
        &format!(r"(?i)</?(?:{})\b[^>]*>?", REMOVED_ELEMENTS.join("|")),
        Rewrite::Remove,
    ));

    // Inside a start tag, name=value pairs whose value starts with a
    // script-capable scheme go as a whole, so a link loses its href instead
    // of keeping a rewritten one. Prose is left to the scheme rules below.
    rules.push(builtin(
        "attribute with unsafe url",
        r"(?i)<[a-z][^>]*>?",
        Rewrite::Replace(strip_unsafe_url_attributes),
    ));
    rules.push(builtin(
        "event handler",
        r#"(?i)(^|[\s/"'=])on\w+\s*=\s*(?:"[^"]*"?|'[^']*'?|[^\s>]*)"#,
        Rewrite::KeepSeparator,
    ));

    rules.push(builtin("script scheme", r"(?i)(?:java|vb)script\s*:", Rewrite::Remove));
    rules.push(builtin(
        "data url",
        r"(?i)\bdata\s*:(\s*image/)?",
        Rewrite::RemoveIf(non_image_data_url),
    ));

    rules.push(builtin("css expression", r"(?i)expression\s*\(", Rewrite::Remove));
    rules.push(builtin("css behavior", r"(?i)behavior\s*:", Rewrite::Remove));
    rules.push(builtin("css binding", r"(?i)-moz-binding\s*:", Rewrite::Remove));

    rules.into()
});

/// Ordered dangerous-pattern list plus the fixed-point driver.
#[derive(Debug, Clone)]
pub struct PatternScrubber {
    rules: Arc<[PatternRule]>,
}

impl PatternScrubber {
    /// The built-in rule list, compiled once per process.
    pub fn standard() -> Self {
        Self {
            rules: Arc::clone(&STANDARD_RULES),
        }
    }

    /// Scrubber with a caller-supplied rule list.
    pub fn with_rules(rules: Vec<PatternRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Remove every dangerous construct. Unmatched input is returned as is.
    ///
    /// Input still changing after [`MAX_ROUNDS`] rounds yields `""`.
    pub fn scrub(&self, html: &str) -> String {
        self.scrub_counted(html).0
    }

    /// Scrub, also returning how many rounds over the rule list ran
    fn scrub_counted(&self, html: &str) -> (String, usize) {
        let mut current = html.to_string();
        let mut rounds = 0usize;
        let mut removed = 0usize;

        loop {
            if rounds == MAX_ROUNDS {
                warn!(
                    target: crate::LOG_TARGET,
                    "{} byte input still changing after {} scrub rounds, discarding it",
                    html.len(),
                    MAX_ROUNDS
                );
                return (String::new(), rounds);
            }
            rounds += 1;
            let before = current.len();
            for rule in self.rules.iter() {
                let (next, hits) = rule.apply(&current);
                if hits > 0 {
                    debug!(target: crate::LOG_TARGET, "rule '{}' removed {} match(es)", rule.name, hits);
                    removed += hits;
                    current = next;
                }
            }
            if current.len() == before {
                break;
            }
        }

        if removed > 0 {
            debug!(
                target: crate::LOG_TARGET,
                "scrubbed {} construct(s) in {} round(s), {} -> {} bytes",
                removed,
                rounds,
                html.len(),
                current.len()
            );
        }
        (current, rounds)
    }
}

impl Default for PatternScrubber {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrub(input: &str) -> String {
        PatternScrubber::standard().scrub(input)
    }

    #[test]
    fn test_removes_script_element_and_body() {
        let out = scrub("<p>Hello</p><script>alert(1)</script><p>World</p>");
        assert_eq!(out, "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn test_script_variants() {
        assert_eq!(scrub("a<SCRIPT\n\t>x</script >b"), "ab");
        assert_eq!(scrub("a<script src=x.js />b"), "ab");
        assert_eq!(scrub("a<script src=x.js"), "a");
        assert_eq!(scrub("a</script>b"), "ab");
    }

    #[test]
    fn test_non_greedy_body_match() {
        let out = scrub("<style>a{}</style><p>keep</p><style>b{}</style>");
        assert_eq!(out, "<p>keep</p>");
    }

    #[test]
    fn test_removes_every_listed_element() {
        for tag in REMOVED_ELEMENTS {
            let out = scrub(&format!("x<{tag} a=1>y</{tag}>z"));
            assert!(!out.to_lowercase().contains(&format!("<{tag}")), "{tag}: {out}");
        }
    }

    #[test]
    fn test_frame_does_not_swallow_frameset_text() {
        assert_eq!(scrub("<frameset><frame src=a></frameset>ok"), "ok");
    }

    #[test]
    fn test_event_handlers() {
        assert_eq!(scrub(r#"<img src="x" onerror="alert(1)">"#), r#"<img src="x" >"#);
        assert_eq!(scrub("<img src=x onerror=alert(1)>"), "<img src=x >");
        assert_eq!(scrub("<img src=x/onload=y>"), "<img src=x/>");
        assert_eq!(scrub(r#"<b ONMOUSEOVER = 'x'>"#), "<b >");
    }

    #[test]
    fn test_event_handler_needs_separator() {
        assert_eq!(scrub("<p>reason=1</p>"), "<p>reason=1</p>");
    }

    #[test]
    fn test_unsafe_href_is_removed_whole() {
        assert_eq!(scrub(r#"<a href="javascript:alert(1)">x</a>"#), "<a >x</a>");
        assert_eq!(scrub("<a href=' VBScript:msgbox(1)'>x</a>"), "<a >x</a>");
        assert_eq!(scrub(r#"<a href="data:text/html,hi">x</a>"#), "<a >x</a>");
        assert_eq!(
            scrub(r#"<img src="data:image/png;base64,AAA">"#),
            r#"<img src="data:image/png;base64,AAA">"#
        );
    }

    #[test]
    fn test_schemes_anywhere() {
        assert_eq!(scrub("go to JavaScript:void(0)"), "go to void(0)");
        assert_eq!(scrub("data:text/plain"), "text/plain");
        assert_eq!(scrub("data:image/gif"), "data:image/gif");
    }

    #[test]
    fn test_css_primitives() {
        assert_eq!(
            scrub(r#"<div style="width:expression(alert(1))">"#),
            r#"<div style="width:alert(1))">"#
        );
        assert_eq!(scrub("behavior: url(x.htc)"), " url(x.htc)");
        assert_eq!(scrub("-moz-binding:url(x)"), "url(x)");
    }

    #[test]
    fn test_joined_fragments_are_caught() {
        assert_eq!(scrub("java<script></script>script:alert(1)"), "alert(1)");
        assert_eq!(scrub("<scr<script></script>ipt>alert(1)</script>"), "alert(1)");
    }

    #[test]
    fn test_nested_joins_are_bounded() {
        let scrubber = PatternScrubber::standard();
        let nested = |depth: usize| {
            format!("{}javascript:{}alert(1)", "java".repeat(depth), "script:".repeat(depth))
        };

        let (out, rounds) = scrubber.scrub_counted(&nested(3));
        assert_eq!(out, "alert(1)");
        assert_eq!(rounds, 5);

        // Rounds stay flat however deep the nesting goes, so work grows
        // with the input length only
        for depth in [MAX_ROUNDS, 500, 5_000] {
            let (out, rounds) = scrubber.scrub_counted(&nested(depth));
            assert_eq!(out, "", "depth {depth}");
            assert_eq!(rounds, MAX_ROUNDS, "depth {depth}");
        }
    }

    #[test]
    fn test_unsafe_url_rule_stays_inside_tags() {
        assert_eq!(scrub("x = 'data:text'"), "x = 'text'");
        assert_eq!(scrub("cost=5 and href=vbscript:x"), "cost=5 and href=x");
        assert_eq!(
            scrub(r#"<a title="t" href="javascript:alert(1)" target=_blank>x</a>"#),
            r#"<a title="t"  target=_blank>x</a>"#
        );
        assert_eq!(
            scrub("<img src=data:text/html,x alt=a><a href='vbscript:y'>"),
            "<img  alt=a><a >"
        );
    }

    #[test]
    fn test_safe_markup_passes_through() {
        let html = r#"<p class="lead">Hello <a href="https://example.com">World</a></p>"#;
        assert_eq!(scrub(html), html);
    }

    #[test]
    fn test_custom_rule_list() {
        let scrubber = PatternScrubber::with_rules(vec![
            PatternRule::removal("marquee only", r"(?i)</?marquee[^>]*>").unwrap(),
        ]);
        assert_eq!(scrubber.rules()[0].name(), "marquee only");
        assert_eq!(scrubber.scrub("<marquee>hi</marquee><script>"), "hi<script>");
    }
}
