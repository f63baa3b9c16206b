use crate::arabic::{contains_arabic, reshape};
use crate::correction::{remove_extra_spaces, TextCorrector};
use crate::language::LanguageSet;

// "السلام": alef, lam, seen, lam, alef, meem. The inner lam-alef pair
// collapses into its final-form ligature.
const SALAM: &str = "\u{0627}\u{0644}\u{0633}\u{0644}\u{0627}\u{0645}";
const SALAM_SHAPED: &str = "\u{FE8D}\u{FEDF}\u{FEB4}\u{FEFC}\u{FEE1}";

#[test]
fn reshape_produces_contextual_forms_and_ligatures() {
    assert_eq!(reshape(SALAM), SALAM_SHAPED);
}

#[test]
fn reshape_is_stable_on_already_shaped_text() {
    let shaped = reshape(SALAM);
    assert_eq!(reshape(&shaped), shaped);
}

#[test]
fn reshape_leaves_non_arabic_text_alone() {
    assert_eq!(reshape("plain latin text 123"), "plain latin text 123");
}

#[test]
fn arabic_detection_covers_base_and_presentation_forms() {
    assert!(contains_arabic(SALAM));
    assert!(contains_arabic(SALAM_SHAPED));
    assert!(!contains_arabic("no arabic here"));
}

#[test]
fn arabic_paragraphs_are_shaped_and_visually_reordered() {
    let corrector = TextCorrector::default();
    let outcome = corrector.correct(SALAM, &LanguageSet::from_codes(["ara"]));

    // Shaped, then reversed into visual order for a pure RTL line.
    let expected: String = SALAM_SHAPED.chars().rev().collect();
    assert_eq!(outcome.text, expected);
    assert!(!outcome.degraded);
}

#[test]
fn english_paragraphs_get_spell_corrected() {
    let corrector = TextCorrector::default();
    let input = "The government report will review the speling of every document in the national system.";
    let outcome = corrector.correct(input, &LanguageSet::default());
    assert!(outcome.text.contains("spelling"), "got {}", outcome.text);
    assert!(!outcome.text.contains("speling"));
}

#[test]
fn spelling_pass_can_be_disabled() {
    let corrector = TextCorrector::new(false);
    let input = "The government report will review the speling of every document in the national system.";
    let outcome = corrector.correct(input, &LanguageSet::default());
    assert_eq!(outcome.text, input);
}

#[test]
fn blank_paragraph_separators_are_preserved() {
    let corrector = TextCorrector::new(false);
    let input = "first paragraph of the document\n\nsecond paragraph of the document";
    let outcome = corrector.correct(input, &LanguageSet::default());
    assert_eq!(outcome.text.matches("\n\n").count(), 1);
}

#[test]
fn single_language_page_hint_applies_to_unclassifiable_paragraphs() {
    let corrector = TextCorrector::default();
    // No letters for the model, no Arabic script, so the page-level set
    // is the deciding hint; its code flows out of resolution intact.
    let input = "2024 10 05";
    let outcome = corrector.correct(input, &LanguageSet::from_codes(["ara"]));
    assert_eq!(outcome.text, input);
    assert!(!outcome.degraded);
}

#[test]
fn unclassifiable_text_passes_through_unchanged() {
    let corrector = TextCorrector::default();
    // Digits only, and a multi-language page set, so no hint applies.
    let input = "1234567 89012";
    let outcome = corrector.correct(input, &LanguageSet::from_codes(["eng", "ara"]));
    assert_eq!(outcome.text, input);
    assert!(!outcome.degraded);
}

#[test]
fn extra_spaces_collapse_within_lines() {
    assert_eq!(remove_extra_spaces("a   b\t\tc"), "a b c");
}

#[test]
fn excess_blank_lines_collapse_to_one() {
    assert_eq!(remove_extra_spaces("a\n\n\n\n\nb"), "a\n\nb");
}

#[test]
fn trailing_whitespace_is_trimmed_per_line() {
    assert_eq!(remove_extra_spaces("a   \nb"), "a\nb");
}
