//! Text canonicalization shared by the amount and date extractors.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Characters kept besides ASCII letters, digits and whitespace.
const KEPT_PUNCTUATION: &[char] = &['.', ',', ':', '-', '/', '$'];

/// Canonicalize OCR text: strip diacritics, lower-case, blank out everything
/// except letters, digits and `.,:-/$`, then collapse whitespace.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let lowered = transliterate(text).to_lowercase();
    let restricted: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    restricted.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Closest ASCII rendering of accented Latin text. Letters with no ASCII
/// decomposition and no entry in the fallback table are passed through.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        match fold_special(c) {
            Some(s) => out.push_str(s),
            None => out.push(c),
        }
    }
    out
}

fn fold_special(c: char) -> Option<&'static str> {
    let s = match c {
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'đ' => "d",
        'Đ' => "D",
        'ł' => "l",
        'Ł' => "L",
        'ı' => "i",
        '¡' | '¿' => " ",
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_lowercases() {
        assert_eq!(normalize("ÁRBOL Pequeño Café"), "arbol pequeno cafe");
    }

    #[test]
    fn restricts_punctuation() {
        assert_eq!(normalize("TOTAL: $1,234.56 (MXN)!"), "total: $1,234.56 mxn");
        assert_eq!(normalize("nov|25 'x' #7"), "nov 25 x 7");
        assert_eq!(normalize("12/11-2025"), "12/11-2025");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  a \t\n  b  "), "a b");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n "), "");
    }

    #[test]
    fn underscores_are_not_kept() {
        assert_eq!(normalize("foo_bar"), "foo bar");
    }

    #[test]
    fn letters_without_decomposition() {
        assert_eq!(normalize("Straße Ørsted"), "strasse orsted");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "",
            "OXXO Tienda #123\nTOTAL: $ 88,00",
            "  Crème Brûlée — 12 NOV '25 ",
            "Ñandú ¡Gracias! ¿Vuelva pronto?",
            "½ ﬁle №5 ℃",
            "Straße æøå İstanbul",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
