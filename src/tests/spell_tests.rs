use crate::spell::{correct_text, is_supported};

#[test]
fn supported_languages_have_dictionaries() {
    for lang in ["eng", "spa", "fra", "deu", "ita"] {
        assert!(is_supported(lang), "{lang} should be supported");
    }
    assert!(!is_supported("ara"));
    assert!(!is_supported("rus"));
}

#[test]
fn known_words_pass_through() {
    assert_eq!(correct_text("the world is large", "eng"), "the world is large");
}

#[test]
fn single_edit_typos_are_fixed() {
    assert_eq!(correct_text("the speling of the word", "eng"), "the spelling of the word");
    assert_eq!(correct_text("the wrld is large", "eng"), "the world is large");
}

#[test]
fn capitalization_is_preserved() {
    assert_eq!(correct_text("Speling", "eng"), "Spelling");
}

#[test]
fn very_short_words_are_left_alone() {
    // Two-letter noise from OCR shouldn't be "corrected" into words.
    assert_eq!(correct_text("xz", "eng"), "xz");
}

#[test]
fn punctuation_survives_correction() {
    assert_eq!(correct_text("wrld, again!", "eng"), "world, again!");
}

#[test]
fn unsupported_language_returns_input_unchanged() {
    assert_eq!(correct_text("привет мир", "rus"), "привет мир");
}

#[test]
fn spanish_dictionary_is_used_for_spanish() {
    assert_eq!(correct_text("el gobierno", "spa"), "el gobierno");
}
