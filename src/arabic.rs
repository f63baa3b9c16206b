//! Contextual glyph joining for Arabic text.
//!
//! OCR engines emit Arabic as isolated base letters in logical order.
//! Rendering (and plain-text viewers without a shaping engine) need the
//! Unicode presentation forms instead: each letter takes an isolated,
//! final, initial, or medial shape depending on its neighbours, and the
//! lam-alef pairs collapse into ligatures. This module performs that
//! joining; bidirectional reordering is layered on top by the corrector.

/// Presentation forms for one base letter: isolated, final, initial, medial.
/// A zero entry means the letter has no such form.
type Forms = [u32; 4];

const ISOLATED: usize = 0;
const FINAL: usize = 1;
const INITIAL: usize = 2;
const MEDIAL: usize = 3;

fn forms(c: char) -> Option<Forms> {
    let f: Forms = match c {
        '\u{0621}' => [0xFE80, 0, 0, 0],
        '\u{0622}' => [0xFE81, 0xFE82, 0, 0],
        '\u{0623}' => [0xFE83, 0xFE84, 0, 0],
        '\u{0624}' => [0xFE85, 0xFE86, 0, 0],
        '\u{0625}' => [0xFE87, 0xFE88, 0, 0],
        '\u{0626}' => [0xFE89, 0xFE8A, 0xFE8B, 0xFE8C],
        '\u{0627}' => [0xFE8D, 0xFE8E, 0, 0],
        '\u{0628}' => [0xFE8F, 0xFE90, 0xFE91, 0xFE92],
        '\u{0629}' => [0xFE93, 0xFE94, 0, 0],
        '\u{062A}' => [0xFE95, 0xFE96, 0xFE97, 0xFE98],
        '\u{062B}' => [0xFE99, 0xFE9A, 0xFE9B, 0xFE9C],
        '\u{062C}' => [0xFE9D, 0xFE9E, 0xFE9F, 0xFEA0],
        '\u{062D}' => [0xFEA1, 0xFEA2, 0xFEA3, 0xFEA4],
        '\u{062E}' => [0xFEA5, 0xFEA6, 0xFEA7, 0xFEA8],
        '\u{062F}' => [0xFEA9, 0xFEAA, 0, 0],
        '\u{0630}' => [0xFEAB, 0xFEAC, 0, 0],
        '\u{0631}' => [0xFEAD, 0xFEAE, 0, 0],
        '\u{0632}' => [0xFEAF, 0xFEB0, 0, 0],
        '\u{0633}' => [0xFEB1, 0xFEB2, 0xFEB3, 0xFEB4],
        '\u{0634}' => [0xFEB5, 0xFEB6, 0xFEB7, 0xFEB8],
        '\u{0635}' => [0xFEB9, 0xFEBA, 0xFEBB, 0xFEBC],
        '\u{0636}' => [0xFEBD, 0xFEBE, 0xFEBF, 0xFEC0],
        '\u{0637}' => [0xFEC1, 0xFEC2, 0xFEC3, 0xFEC4],
        '\u{0638}' => [0xFEC5, 0xFEC6, 0xFEC7, 0xFEC8],
        '\u{0639}' => [0xFEC9, 0xFECA, 0xFECB, 0xFECC],
        '\u{063A}' => [0xFECD, 0xFECE, 0xFECF, 0xFED0],
        '\u{0641}' => [0xFED1, 0xFED2, 0xFED3, 0xFED4],
        '\u{0642}' => [0xFED5, 0xFED6, 0xFED7, 0xFED8],
        '\u{0643}' => [0xFED9, 0xFEDA, 0xFEDB, 0xFEDC],
        '\u{0644}' => [0xFEDD, 0xFEDE, 0xFEDF, 0xFEE0],
        '\u{0645}' => [0xFEE1, 0xFEE2, 0xFEE3, 0xFEE4],
        '\u{0646}' => [0xFEE5, 0xFEE6, 0xFEE7, 0xFEE8],
        '\u{0647}' => [0xFEE9, 0xFEEA, 0xFEEB, 0xFEEC],
        '\u{0648}' => [0xFEED, 0xFEEE, 0, 0],
        '\u{0649}' => [0xFEEF, 0xFEF0, 0, 0],
        '\u{064A}' => [0xFEF1, 0xFEF2, 0xFEF3, 0xFEF4],
        _ => return None,
    };
    Some(f)
}

/// Lam-alef ligatures: (alef variant, isolated form, final form).
const LAM_ALEF: &[(char, u32, u32)] = &[
    ('\u{0622}', 0xFEF5, 0xFEF6),
    ('\u{0623}', 0xFEF7, 0xFEF8),
    ('\u{0625}', 0xFEF9, 0xFEFA),
    ('\u{0627}', 0xFEFB, 0xFEFC),
];

const LAM: char = '\u{0644}';
const TATWEEL: char = '\u{0640}';

/// Harakat and other combining marks are transparent for joining purposes.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0610}'..='\u{061A}')
}

/// Whether a shaped letter connects to the letter after it (to its left in
/// visual order): it must have initial/medial forms, or be tatweel.
fn joins_forward(c: char) -> bool {
    c == TATWEEL || forms(c).map(|f| f[INITIAL] != 0).unwrap_or(false)
}

/// Whether a letter accepts a connection from the letter before it.
fn joins_backward(c: char) -> bool {
    c == TATWEEL || forms(c).map(|f| f[FINAL] != 0).unwrap_or(false)
}

/// Whether the text contains any character from the Arabic blocks, shaped
/// or unshaped.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}'
            | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
    })
}

/// Replace Arabic base letters with their contextual presentation forms.
///
/// Already-shaped text passes through unchanged (presentation forms are not
/// in the base-letter table), which makes repeated application stable.
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        let Some(f) = forms(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let prev_joins = prev_letter(&chars, i).map(joins_forward).unwrap_or(false);

        // Lam followed by an alef variant collapses into a ligature.
        if c == LAM {
            if let Some(next_idx) = next_letter_index(&chars, i) {
                if let Some(&(_, iso, fin)) = LAM_ALEF
                    .iter()
                    .find(|(alef, _, _)| *alef == chars[next_idx])
                {
                    let lig = if prev_joins { fin } else { iso };
                    // Transparent marks between lam and alef stay attached.
                    out.push(char::from_u32(lig).unwrap_or(c));
                    for &mark in &chars[i + 1..next_idx] {
                        out.push(mark);
                    }
                    i = next_idx + 1;
                    continue;
                }
            }
        }

        let next_joins = next_letter_index(&chars, i)
            .map(|j| joins_backward(chars[j]))
            .unwrap_or(false);
        let curr_forward = f[INITIAL] != 0;

        let mut form = match (prev_joins, next_joins && curr_forward) {
            (true, true) => MEDIAL,
            (true, false) => FINAL,
            (false, true) => INITIAL,
            (false, false) => ISOLATED,
        };

        // Degrade to the nearest available form.
        while f[form] == 0 {
            form = match form {
                MEDIAL => FINAL,
                INITIAL => ISOLATED,
                FINAL => ISOLATED,
                _ => break,
            };
        }

        out.push(char::from_u32(f[form]).unwrap_or(c));
        i += 1;
    }

    out
}

fn prev_letter(chars: &[char], i: usize) -> Option<char> {
    chars[..i]
        .iter()
        .rev()
        .copied()
        .find(|&c| !is_transparent(c))
        .filter(|&c| forms(c).is_some() || c == TATWEEL)
}

fn next_letter_index(chars: &[char], i: usize) -> Option<usize> {
    chars
        .iter()
        .enumerate()
        .skip(i + 1)
        .find(|(_, c)| !is_transparent(**c))
        .filter(|(_, c)| forms(**c).is_some() || **c == TATWEEL)
        .map(|(j, _)| j)
}
