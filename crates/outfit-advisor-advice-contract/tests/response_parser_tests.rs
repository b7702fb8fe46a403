//! Tests the advice Markdown grammar and its fallbacks.

use outfit_advisor_advice_contract::{
    AdviceReport, FALLBACK_COLOR_ANALYSIS, FALLBACK_EMPTY_SUGGESTIONS, FALLBACK_HIGHLIGHTS,
    FALLBACK_QUICK_TAKE, FALLBACK_SCORE, FALLBACK_SUGGESTIONS, parse_advice_markdown,
    render_advice, split_suggestions,
};

const FULL: &str = "\
# Outfit Rating: 78/100

## Quick Take
  Relaxed but put together.

## Highlights
The denim jacket frames the shoulders.
Cuffed jeans show off the boots.

## Color Analysis
Indigo and tan are a classic pairing.

## Suggestions
* Tuck the shirt
* Swap to a leather belt
";

#[test]
fn response_parser_tests_extracts_every_marker() {
    let report = parse_advice_markdown(FULL);

    assert_eq!(report.score, "78");
    assert_eq!(report.score_value(), Some(78));
    assert_eq!(report.quick_take, "Relaxed but put together.");
    assert_eq!(
        report.highlights,
        "The denim jacket frames the shoulders.\nCuffed jeans show off the boots."
    );
    assert_eq!(report.color_analysis, "Indigo and tan are a classic pairing.");
    assert_eq!(report.suggestions, vec!["Tuck the shirt", "Swap to a leather belt"]);
    assert!(!report.degraded);
}

#[test]
fn response_parser_tests_missing_markers_use_fallbacks() {
    let report = parse_advice_markdown("Just some prose without headings.");

    assert_eq!(report.score, FALLBACK_SCORE);
    assert_eq!(report.quick_take, FALLBACK_QUICK_TAKE);
    assert_eq!(report.highlights, FALLBACK_HIGHLIGHTS);
    assert_eq!(report.color_analysis, FALLBACK_COLOR_ANALYSIS);
    assert_eq!(report.suggestions, vec![FALLBACK_SUGGESTIONS]);
}

#[test]
fn response_parser_tests_sections_in_any_order() {
    let report = parse_advice_markdown(
        "## Suggestions\n* Roll the sleeves\n## Quick Take\nSharp.\n# Outfit Rating: 95/100\n",
    );
    assert_eq!(report.score, "95");
    assert_eq!(report.quick_take, "Sharp.");
    assert_eq!(report.suggestions, vec!["Roll the sleeves"]);
}

#[test]
fn response_parser_tests_unknown_heading_ends_body() {
    let report = parse_advice_markdown("## Highlights\nGreat shoes.\n### Aside\nignored text\n");
    assert_eq!(report.highlights, "Great shoes.");
}

#[test]
fn response_parser_tests_inline_hash_does_not_end_body() {
    let report = parse_advice_markdown("## Highlights\nThe #1 piece is the coat.\n");
    assert_eq!(report.highlights, "The #1 piece is the coat.");
}

#[test]
fn response_parser_tests_first_non_empty_occurrence_wins() {
    let report = parse_advice_markdown(
        "## Quick Take\n\n## Quick Take\nSecond.\n## Quick Take\nThird.\n",
    );
    assert_eq!(report.quick_take, "Second.");
}

#[test]
fn response_parser_tests_malformed_rating_falls_back() {
    assert_eq!(parse_advice_markdown("# Outfit Rating: great/100").score, FALLBACK_SCORE);
    assert_eq!(parse_advice_markdown("# Outfit Rating: 80").score, FALLBACK_SCORE);
}

#[test]
fn response_parser_tests_splits_suggestions_on_asterisks() {
    assert_eq!(split_suggestions("* A * B * "), vec!["A", "B"]);

    let report = parse_advice_markdown("## Suggestions\n* \n*\n");
    assert_eq!(report.suggestions, vec![FALLBACK_EMPTY_SUGGESTIONS]);
}

#[test]
fn response_parser_tests_missing_advice_is_degraded() {
    assert_eq!(render_advice(None), AdviceReport::degraded(""));
    assert!(render_advice(None).degraded);
    assert_eq!(render_advice(Some(FULL)).score, "78");
}
