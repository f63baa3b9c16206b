//! Statistical word-level spell correction for Latin-script languages.
//!
//! Norvig-style: unknown words are replaced by the highest-frequency
//! dictionary entry within edit distance one (or two, for short words).
//! Correction is best-effort by contract; technical terms and proper names
//! may be altered, which the pipeline accepts as a precision/recall
//! tradeoff rather than a correctness guarantee.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

/// Tesseract codes with a bundled frequency dictionary.
pub const SUPPORTED: &[&str] = &["eng", "spa", "fra", "deu", "ita"];

const MAX_EDIT2_LEN: usize = 12;

struct Dictionary {
    freq: HashMap<String, u64>,
    alphabet: &'static [char],
}

impl Dictionary {
    fn parse(raw: &str, alphabet: &'static [char]) -> Self {
        let mut freq = HashMap::new();
        for line in raw.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(word), Some(count)) = (parts.next(), parts.next()) {
                if let Ok(count) = count.parse::<u64>() {
                    freq.insert(word.to_lowercase(), count);
                }
            }
        }
        Self { freq, alphabet }
    }

    fn known(&self, word: &str) -> bool {
        self.freq.contains_key(word)
    }

    fn best(&self, candidates: impl IntoIterator<Item = String>) -> Option<String> {
        candidates
            .into_iter()
            .filter_map(|c| self.freq.get(&c).map(|&f| (c, f)))
            .max_by_key(|&(_, f)| f)
            .map(|(c, _)| c)
    }

    fn edits1(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        let mut edits = Vec::new();
        for i in 0..=chars.len() {
            // Deletions and transpositions.
            if i < chars.len() {
                let mut deleted = chars.clone();
                deleted.remove(i);
                edits.push(deleted.iter().collect());
            }
            if i + 1 < chars.len() {
                let mut swapped = chars.clone();
                swapped.swap(i, i + 1);
                edits.push(swapped.iter().collect());
            }
            // Replacements and insertions.
            for &a in self.alphabet {
                if i < chars.len() {
                    let mut replaced = chars.clone();
                    replaced[i] = a;
                    edits.push(replaced.iter().collect());
                }
                let mut inserted = chars.clone();
                inserted.insert(i, a);
                edits.push(inserted.iter().collect());
            }
        }
        edits
    }

    fn correct(&self, word: &str) -> Option<String> {
        if self.known(word) {
            return None;
        }
        let edits1 = self.edits1(word);
        if let Some(best) = self.best(edits1.iter().cloned()) {
            return Some(best);
        }
        if word.chars().count() > MAX_EDIT2_LEN {
            return None;
        }
        self.best(
            edits1
                .iter()
                .flat_map(|e| self.edits1(e))
                .filter(|e| self.known(e)),
        )
    }
}

const LATIN: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const SPANISH: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'á', 'é', 'í', 'ó', 'ú', 'ñ', 'ü',
];
const FRENCH: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'à', 'â', 'ç', 'è', 'é', 'ê', 'ë', 'î', 'ï', 'ô',
    'ù', 'û', 'ü',
];
const GERMAN: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ü', 'ß',
];
const ITALIAN: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'à', 'è', 'é', 'ì', 'ò', 'ù',
];

fn dictionaries() -> &'static HashMap<&'static str, Dictionary> {
    static DICTS: OnceLock<HashMap<&'static str, Dictionary>> = OnceLock::new();
    DICTS.get_or_init(|| {
        let mut dicts = HashMap::new();
        dicts.insert(
            "eng",
            Dictionary::parse(include_str!("dictionaries/eng.txt"), LATIN),
        );
        dicts.insert(
            "spa",
            Dictionary::parse(include_str!("dictionaries/spa.txt"), SPANISH),
        );
        dicts.insert(
            "fra",
            Dictionary::parse(include_str!("dictionaries/fra.txt"), FRENCH),
        );
        dicts.insert(
            "deu",
            Dictionary::parse(include_str!("dictionaries/deu.txt"), GERMAN),
        );
        dicts.insert(
            "ita",
            Dictionary::parse(include_str!("dictionaries/ita.txt"), ITALIAN),
        );
        dicts
    })
}

/// Whether a spell dictionary is bundled for the given Tesseract code.
pub fn is_supported(lang: &str) -> bool {
    SUPPORTED.contains(&lang)
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{L}+").expect("valid word regex"))
}

/// Restore the casing pattern of `original` onto `corrected`.
fn match_case(original: &str, corrected: &str) -> String {
    let mut chars = original.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            if original.chars().all(|c| c.is_uppercase()) && original.chars().count() > 1 {
                corrected.to_uppercase()
            } else {
                let mut out: String = corrected
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().collect::<String>())
                    .unwrap_or_default();
                out.extend(corrected.chars().skip(1));
                out
            }
        }
        _ => corrected.to_string(),
    }
}

/// Correct each word of `text` against the dictionary for `lang`.
///
/// Words already known, very short words, and words the dictionary has no
/// close candidate for are left untouched. Returns the input unchanged for
/// languages without a bundled dictionary.
pub fn correct_text(text: &str, lang: &str) -> String {
    let Some(dict) = dictionaries().get(lang) else {
        return text.to_string();
    };

    word_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let word = &caps[0];
            if word.chars().count() < 3 {
                return word.to_string();
            }
            let lower = word.to_lowercase();
            match dict.correct(&lower) {
                Some(fixed) => {
                    trace!(from = word, to = %fixed, lang, "spell-corrected word");
                    match_case(word, &fixed)
                }
                None => word.to_string(),
            }
        })
        .to_string()
}
