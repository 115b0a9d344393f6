//! Property-based tests: arbitrary markup must compile to safe, stable HTML.

use dtext::{ParseOptions, parse};
use proptest::prelude::*;

/// Fragments that exercise every construct, glued together at random.
fn markup() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "[b]", "[/b]", "[i]", "[/i]", "[quote]", "[/quote]", "[spoiler]", "[/spoiler]",
        "[table]", "[/table]", "[tr]", "[td]", "[/td]", "[th colspan=2]", "[code]", "[/code]",
        "[nodtext]", "[/nodtext]", "[section=x]", "[/section]", "[tn]", "[/tn]", "[hr]",
        "[url=https://a.com]", "[url]", "[/url]", "[color=red]", "[/color]", "<b>", "</b>",
        "<a href=\"/x\">", "</a>", "\"", "\":", "https://a.com/(x)", "[[", "]]", "{{", "}}",
        "|", "#", "@bob", "<@bob>", "post #1", "thumb #2", "h1. ", "* ", "** ", "\n", "\n\n",
        " ", "x", "東方", "&amp;", "&lbrack;", "<script>", "'", "javascript:",
    ]);
    prop::collection::vec(pieces, 0..40).prop_map(|pieces| pieces.concat())
}

fn options() -> ParseOptions {
    let mut options = ParseOptions::default();
    options.domain = Some("e621.net".into());
    options.qtags = true;
    options.allow_color = true;
    options.max_thumbs = Some(3);
    options
}

proptest! {
    #[test]
    fn never_panics_on_arbitrary_text(input in "\\PC*") {
        let _ = parse(Some(&input), &options());
    }

    #[test]
    fn never_emits_raw_script(input in markup()) {
        let result = parse(Some(&input), &options()).unwrap().unwrap_or_default();
        prop_assert!(!result.html.contains("<script"));
        prop_assert!(!result.html.contains("href=\"javascript:"));
    }

    #[test]
    fn reparsing_output_stays_safe(input in markup()) {
        let first = parse(Some(&input), &options()).unwrap().unwrap_or_default();
        let second = parse(Some(&first.html), &options()).unwrap().unwrap_or_default();
        prop_assert!(!second.html.contains("<script"));
        prop_assert!(!second.html.contains("href=\"javascript:"));
    }

    #[test]
    fn output_is_deterministic(input in markup()) {
        let first = parse(Some(&input), &options()).unwrap();
        let second = parse(Some(&input), &options()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn element_tags_are_balanced(input in markup()) {
        let html = parse(Some(&input), &options()).unwrap().unwrap_or_default().html;
        for tag in ["p", "strong", "em", "blockquote", "table", "tr", "td", "a", "ul", "li", "details", "span"] {
            let opens = html.matches(&format!("<{tag}>")).count()
                + html.matches(&format!("<{tag} ")).count();
            let closes = html.matches(&format!("</{tag}>")).count();
            prop_assert_eq!(opens, closes, "unbalanced <{}> in {}", tag, html);
        }
    }

    #[test]
    fn thumbs_respect_cap(count in 0usize..10) {
        let input = (0..count).map(|i| format!("thumb #{i} ")).collect::<String>();
        let result = parse(Some(&input), &options()).unwrap().unwrap_or_default();
        prop_assert!(result.post_ids.len() <= 3);
    }
}
