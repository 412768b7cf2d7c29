//! Accent- and case-insensitive comparison of Spanish text.
//!
//! Free-text answers are graded by comparing normalized forms, so
//! "Cómo estás" and "como estas" are the same answer.

use unicode_normalization::UnicodeNormalization;

/// Known mis-encodings found in stored lesson content.
///
/// These are applied before decomposition since they never decompose
/// into a base letter plus a mark.
const LEGACY_SUBSTITUTIONS: &[(char, char)] = &[
    ('単', 'n'), // mis-encoded ñ
    ('端', 'u'), // mis-encoded ü
];

/// Combining diacritical marks block (U+0300..=U+036F)
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn substitute_legacy(c: char) -> char {
    LEGACY_SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Canonicalize text for answer comparison
///
/// Lower-cases, repairs legacy mis-encodings, strips diacritics
/// (so `á é í ó ú ü ñ` fold to `a e i o u u n`) and trims.
/// Total and idempotent.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(substitute_legacy)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.trim().to_string()
}

/// Compare two texts ignoring accents and case
pub fn compare(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folding() {
        assert!(compare("Tengo", "tengo"));
    }

    #[test]
    fn test_accent_folding() {
        assert!(compare("ESTÁ", "esta"));
        assert!(compare("Cómo estás", "como estas"));
        assert_eq!(normalize("áéíóúü"), "aeiouu");
        assert_eq!(normalize("Mañana"), "manana");
    }

    #[test]
    fn test_different_words_mismatch() {
        assert!(!compare("hola", "adios"));
    }

    #[test]
    fn test_punctuation_and_order_matter() {
        assert!(!compare("¿Cómo estás?", "como estas"));
        assert!(!compare("estás cómo", "cómo estás"));
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("  Hola \n"), "hola");
        assert!(compare(" gracias", "Gracias  "));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_legacy_substitutions() {
        assert_eq!(normalize("espa単ol"), "espanol");
        assert_eq!(normalize("ping端ino"), "pinguino");
        assert!(compare("espa単ol", "Español"));
    }

    #[test]
    fn test_precomposed_and_decomposed_agree() {
        // "é" as one code point vs "e" + combining acute
        assert!(compare("caf\u{00e9}", "cafe\u{0301}"));
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "Hola",
            "  ¿Qué tal?  ",
            "ÑANDÚ",
            "pingüino",
            "espa単ol",
            "a \u{0301}",
            "İstanbul",
            "Straße",
        ];

        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }
}
