//! Transaction-date extraction from normalized receipt text.

use recibo_core::TicketDate;

/// Spanish three-letter month abbreviations, in calendar order.
pub const MONTH_ABBREVIATIONS: [(&str, u32); 12] = [
    ("ene", 1),
    ("feb", 2),
    ("mar", 3),
    ("abr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dic", 12),
];

const MONTHS: &str = "ene|feb|mar|abr|may|jun|jul|ago|sep|oct|nov|dic";

re!(re_numeric, r"\b([0-3]?\d)[/\-]([01]?\d)[/\-](\d{4}|\d{2})\b");
// `1` misread as i/l/| right after a month, unless it starts a longer word.
re!(re_misread_one, &format!(r"({MONTHS})\s*[il|]([^a-z]|$)"));
re!(re_day_month, &format!(r"\b([0-3]?\d)\s*({MONTHS})[a-z]*\s*(\d{{4}}|\d{{2}})\b"));
re!(re_month_day, &format!(r"\b({MONTHS})[a-z]*\s*([0-3]?\d)\s*[' ]?\s*(\d{{4}}|\d{{2}})\b"));

/// Find the first date in normalized text, rendered as `DD/MM/YYYY`.
///
/// Forms are tried in order: numeric `D/M/Y` (or with dashes), then
/// `D <month> Y`, then `<month> D Y`. The calendar is not checked.
pub fn find_date(normalized: &str) -> Option<TicketDate> {
    if let Some(c) = re_numeric().captures(normalized) {
        let day = c[1].parse().ok()?;
        let month = c[2].parse().ok()?;
        return TicketDate::new(day, month, &c[3]);
    }

    let repaired = re_misread_one().replace_all(normalized, "${1} 1${2}");

    if let Some(c) = re_day_month().captures(&repaired) {
        let day = c[1].parse().ok()?;
        return TicketDate::new(day, month_number(&c[2])?, &c[3]);
    }
    if let Some(c) = re_month_day().captures(&repaired) {
        let day = c[2].parse().ok()?;
        return TicketDate::new(day, month_number(&c[1])?, &c[3]);
    }
    None
}

fn month_number(abbr: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == abbr)
        .map(|(_, n)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn date(raw: &str) -> Option<String> {
        find_date(&normalize(raw)).map(|d| d.to_string())
    }

    #[test]
    fn numeric_four_digit_year() {
        assert_eq!(date("FECHA: 12/11/2025 14:32"), Some("12/11/2025".into()));
    }

    #[test]
    fn numeric_two_digit_year() {
        assert_eq!(date("12/11/25"), Some("12/11/2025".into()));
    }

    #[test]
    fn numeric_with_dashes_and_padding() {
        assert_eq!(date("3-7-24"), Some("03/07/2024".into()));
    }

    #[test]
    fn day_before_month_name() {
        assert_eq!(date("12 nov 2025"), Some("12/11/2025".into()));
        assert_eq!(date("5 NOVIEMBRE 25"), Some("05/11/2025".into()));
    }

    #[test]
    fn month_name_before_day() {
        assert_eq!(date("nov 12 2025"), Some("12/11/2025".into()));
        assert_eq!(date("DIC 24 '25"), Some("24/12/2025".into()));
    }

    #[test]
    fn full_month_name_is_not_corrupted() {
        assert_eq!(date("1 julio 2025"), Some("01/07/2025".into()));
        assert_eq!(date("abril 3 2024"), Some("03/04/2024".into()));
    }

    #[test]
    fn misread_one_after_month() {
        assert_eq!(date("NOV l5 2025"), Some("15/11/2025".into()));
        assert_eq!(date("novi2'25"), Some("12/11/2025".into()));
        assert_eq!(date("ago l0 2023"), Some("10/08/2023".into()));
    }

    #[test]
    fn numeric_form_preferred_over_textual() {
        assert_eq!(date("12 nov 2025 ref 01/02/2024"), Some("01/02/2024".into()));
    }

    #[test]
    fn calendar_is_not_validated() {
        assert_eq!(date("31/02/2025"), Some("31/02/2025".into()));
    }

    #[test]
    fn no_date() {
        assert_eq!(date("TOTAL 88.00"), None);
        assert_eq!(date(""), None);
    }

    #[test]
    fn month_table_is_complete() {
        for (i, (_, n)) in MONTH_ABBREVIATIONS.iter().enumerate() {
            assert_eq!(*n as usize, i + 1);
        }
        assert_eq!(month_number("dic"), Some(12));
        assert_eq!(month_number("xyz"), None);
    }
}
