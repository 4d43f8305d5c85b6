use proptest::prelude::*;
use vellum_sanitizer::tokenizer::{Token, Tokenizer};
use vellum_sanitizer::value::has_unsafe_scheme;
use vellum_sanitizer::*;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Markup fragments that tend to combine into attack shapes.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "<", ">", "/", "=", "\"", "'", " ", "\t", "\n", "<!--", "-->", "<!", "<?", "</",
            "<p>", "</p>", "<b>", "</b>", "<a ", "</a>", "<img ", "<div ", "<span>", "<table>",
            "<script>", "</script>", "<script", "<svg", "</svg>", "<iframe", "<style>",
            "</style>", "<math>", "<template>", "<object", "<embed ", "<form>",
            "href=", "src=", "style=", "title=", "class=", "onerror=", "onload", "on", "click",
            "javascript:", "java", "script", ":", "vbscript:", "data:", "image/", "text/html",
            "expression(", "expression", "(", ")", "behavior:", "-moz-binding:", "url(",
            "&amp;", "&quot;", "&lt;", "&gt;", "&#106;", "&#x6A;", "&colon;", "\\", "/*", "*/",
        ])
        .prop_map(String::from),
        "[a-zA-Z0-9 ]{1,6}",
        "\\PC{1,3}",
    ]
}

fn markup() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..40).prop_map(|parts| parts.concat())
}

fn assert_allowlisted(policy: &SanitizerPolicy, html: &str) -> std::result::Result<(), TestCaseError> {
    for token in Tokenizer::new(html) {
        match token {
            Token::Text(text) => prop_assert!(!text.contains('<'), "raw '<' in text {text:?}"),
            Token::Tag(tag) => {
                prop_assert!(policy.is_tag_allowed(&tag.name), "tag {} in {html:?}", tag.name);
                for attribute in &tag.attributes {
                    let name = attribute.name.to_ascii_lowercase();
                    prop_assert!(
                        policy.is_attribute_allowed(&tag.name, &name),
                        "attribute {name} on {} in {html:?}",
                        tag.name
                    );
                    if let Some(value) = attribute.value {
                        let raw = RawValue::from_markup(value);
                        if name == "href" || name == "src" || name == "cite" {
                            prop_assert!(!has_unsafe_scheme(raw.as_str()), "{html:?}");
                        }
                        if name == "style" {
                            prop_assert!(!raw.as_str().to_lowercase().contains("expression("));
                        }
                    }
                }
            }
            Token::Discarded => prop_assert!(false, "discarded construct in {html:?}"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn sanitize_is_idempotent(input in markup()) {
        let once = sanitize_html(input.as_str());
        let twice = sanitize_html(once.as_str());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn sanitized_output_is_not_dangerous(input in markup()) {
        let clean = sanitize_html(input.as_str());
        prop_assert!(!contains_dangerous_content(&clean), "{:?} -> {:?}", input, clean);
    }

    #[test]
    fn sanitized_output_is_allowlisted(input in markup()) {
        let sanitizer = HtmlSanitizer::default();
        let clean = sanitizer.sanitize(&input);
        assert_allowlisted(sanitizer.policy(), &clean)?;
    }

    #[test]
    fn strict_output_is_allowlisted(input in markup()) {
        let sanitizer = HtmlSanitizer::strict();
        let clean = sanitizer.sanitize(&input);
        assert_allowlisted(sanitizer.policy(), &clean)?;
    }

    #[test]
    fn arbitrary_unicode_never_panics(input in "\\PC*") {
        let clean = sanitize_html(input.as_str());
        prop_assert!(!contains_dangerous_content(&clean));
    }

    #[test]
    fn plain_paragraphs_are_preserved(words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..8)) {
        let html = format!("<p>{}</p>", words.join(" "));
        prop_assert_eq!(sanitize_html(html.as_str()), html);
    }

    #[test]
    fn scrubbing_never_grows_input(input in markup()) {
        prop_assert!(remove_dangerous_patterns_only(&input).len() <= input.len());
    }
}
