//! Merchant-name detection from the top of the raw OCR text.

use recibo_core::{StoreName, MAX_STORE_LEN};

use crate::normalize::normalize;

/// How many leading non-empty lines may hold the merchant name.
pub const HEADER_LINES: usize = 6;

/// Distinctive substring of a normalized line → canonical display name.
/// Checked in order; the first key found in a line wins.
pub const BRANDS: &[(&str, &str)] = &[
    ("starbucks", "Starbucks"),
    ("oxxo", "OXXO"),
    ("walmart", "Walmart"),
    ("soriana", "Soriana"),
    ("heb", "HEB"),
    ("7-eleven", "7-Eleven"),
    ("seven", "7-Eleven"),
    ("chedraui", "Chedraui"),
    ("farmacia", "Farmacia"),
    ("the home depot", "The Home Depot"),
    ("costco", "Costco"),
    ("sam s", "Sam's Club"),
    ("sams", "Sam's Club"),
];

/// Word prefixes that mark a header line as part of the address
/// (`av` covers `ave`, `avda`, `avenida`; `col` covers `colonia`).
pub const ADDRESS_TOKENS: &[&str] = &[
    "calle", "av", "avenida", "col", "cp", "local", "manzana", "monterrey", "nuevo", "leon",
];

re!(re_word, r"[a-zA-Z]{3,}");
re!(re_unwanted, r"[^\p{L}\p{N}\s.\-&]");

/// Find the merchant among the first [`HEADER_LINES`] non-empty lines of raw text.
///
/// A known brand anywhere in those lines wins, earliest line first. Otherwise the
/// first line that has a run of three letters and no address word is cleaned up
/// and used.
pub fn find_store(raw_text: &str) -> Option<StoreName> {
    let header: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADER_LINES)
        .collect();

    if let Some(brand) = header.iter().find_map(|l| canonical_brand(&normalize(l))) {
        return Some(StoreName::new(brand));
    }

    header
        .iter()
        .find(|l| !looks_like_address(&normalize(l)) && re_word().is_match(l))
        .map(|l| StoreName::new(pretty_line(l)))
}

pub fn canonical_brand(line_norm: &str) -> Option<&'static str> {
    BRANDS
        .iter()
        .find(|(key, _)| line_norm.contains(key))
        .map(|(_, display)| *display)
}

fn looks_like_address(line_norm: &str) -> bool {
    line_norm
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| ADDRESS_TOKENS.iter().any(|t| word.starts_with(t)))
}

/// Drop stray symbols, collapse whitespace, title-case, cap the length.
fn pretty_line(line: &str) -> String {
    let cleaned = re_unwanted().replace_all(line, " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed).chars().take(MAX_STORE_LEN).collect()
}

/// Upper-case each letter that follows a non-letter, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
