//! Total-amount extraction from normalized receipt text.

use recibo_core::Money;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Grouped decimal (`1,234.56`, `1.234,56`, `88.00`), ungrouped decimal
/// (`1234.56`), or a bare integer of up to seven digits.
const MONEY: &str = r"\d{1,3}(?:[.,]\d{3})*[.,]\d{2}|\d{4,7}[.,]\d{2}|\d{1,7}";

re!(re_anchored_amount, &format!(
    r"(?:total|importe|pagar|pagada|pago)[^\d]{{0,20}}({MONEY})"
));
re!(re_any_amount, MONEY);

/// Find the receipt total in normalized text.
///
/// Amounts following an anchor keyword win; among them the largest is taken,
/// since the grand total is normally the biggest labelled figure. Without any
/// anchored amount, the largest number anywhere in the text is used.
pub fn find_total(normalized: &str) -> Option<Money> {
    let anchored = re_anchored_amount()
        .captures_iter(normalized)
        .filter_map(|c| parse_amount(c.get(1)?.as_str()))
        .max();
    if anchored.is_some() {
        return anchored;
    }
    re_any_amount()
        .find_iter(normalized)
        .filter_map(|m| parse_amount(m.as_str()))
        .max()
}

/// Resolve which separator is the decimal point and parse.
///
/// * both `,` and `.`: the later one is decimal, the other groups thousands;
/// * only `,` with a two-digit tail: the last `,` is decimal;
/// * only `,` otherwise: thousands separators;
/// * no separator: a whole amount.
pub(crate) fn parse_amount(token: &str) -> Option<Money> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(comma), None) if compact.len() - comma - 1 == 2 => {
            let (int_part, frac_part) = compact.split_at(comma);
            format!("{}.{}", int_part.replace(',', ""), &frac_part[1..])
        }
        (Some(_), None) => compact.replace(',', ""),
        (None, _) => compact,
    };
    let value = Decimal::from_str(&cleaned).ok()?;
    Money::from_decimal(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn total(raw: &str) -> Option<String> {
        find_total(&normalize(raw)).map(|m| m.to_string())
    }

    #[test]
    fn plain_two_decimal_total() {
        assert_eq!(total("TOTAL 123.45"), Some("123.45".into()));
        assert_eq!(total("Importe: $ 0.99"), Some("0.99".into()));
    }

    #[test]
    fn european_grouping() {
        assert_eq!(total("TOTAL: 1.234,56"), Some("1234.56".into()));
    }

    #[test]
    fn us_grouping() {
        assert_eq!(total("TOTAL: 1,234.56"), Some("1234.56".into()));
    }

    #[test]
    fn bare_integer_gets_cents() {
        assert_eq!(total("TOTAL: 101"), Some("101.00".into()));
    }

    #[test]
    fn ungrouped_decimal() {
        assert_eq!(total("total a pagar 1234.56"), Some("1234.56".into()));
    }

    #[test]
    fn comma_decimal() {
        assert_eq!(total("TOTAL $ 88,50"), Some("88.50".into()));
    }

    #[test]
    fn largest_anchored_amount_wins() {
        let text = "SUBTOTAL 50.00\nIVA 8.00\nTOTAL 88.00";
        assert_eq!(total(text), Some("88.00".into()));
    }

    #[test]
    fn anchor_beats_larger_unanchored_number() {
        let text = "TICKET 998877\nCAJA 12\nTOTAL 45.50\nCAMBIO 4.50";
        assert_eq!(total(text), Some("45.50".into()));
    }

    #[test]
    fn anchor_tolerates_noise_before_amount() {
        assert_eq!(total("TOTAL M.N. ==> $ 77.10"), Some("77.10".into()));
    }

    #[test]
    fn amount_too_far_from_anchor_uses_fallback() {
        // 25 non-digit characters between the keyword and the number.
        let text = "total xxxxxxxxxxxxxxxxxxxxxxxxx 12.00 and 30.00";
        assert_eq!(total(text), Some("30.00".into()));
    }

    #[test]
    fn fallback_takes_largest_number() {
        assert_eq!(total("CAFE 35.00\nPAN 12.50"), Some("35.00".into()));
    }

    #[test]
    fn accented_keyword_after_normalization() {
        assert_eq!(total("PAGÓ CON TARJETA 250.00"), Some("250.00".into()));
    }

    #[test]
    fn no_digits_means_no_total() {
        assert_eq!(total("GRACIAS POR SU COMPRA"), None);
        assert_eq!(total(""), None);
    }

    #[test]
    fn parse_amount_rules() {
        let p = |s: &str| parse_amount(s).map(|m| m.to_string());
        assert_eq!(p("1.234,56"), Some("1234.56".into()));
        assert_eq!(p("1,234.56"), Some("1234.56".into()));
        assert_eq!(p("12,50"), Some("12.50".into()));
        assert_eq!(p("1,234,56"), Some("1234.56".into()));
        assert_eq!(p("1,234"), Some("1234.00".into()));
        assert_eq!(p("101"), Some("101.00".into()));
        assert_eq!(p("1.234.56"), None);
    }
}
