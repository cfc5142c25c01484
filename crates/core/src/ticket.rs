use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

pub const DEFAULT_CURRENCY: &str = "MXN";

/// Maximum length, in characters, of a free-text store line.
pub const MAX_STORE_LEN: usize = 60;

// ── Date ──────────────────────────────────────────────────────────────────────

/// A receipt date as printed, rendered `DD/MM/YYYY`.
///
/// The components are kept exactly as read. Nothing checks that the date exists
/// on the calendar (`31/02/2025` is representable); use [`TicketDate::to_naive_date`]
/// when a real date is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketDate {
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a date as DD/MM/YYYY, got '{0}'")]
pub struct TicketDateParseError(pub String);

impl TicketDate {
    /// `year_digits` is the year as written; two-digit years land in the 2000s.
    pub fn new(day: u32, month: u32, year_digits: &str) -> Option<Self> {
        let raw: u32 = year_digits.parse().ok()?;
        let year = if year_digits.len() == 2 { 2000 + raw } else { raw };
        Some(TicketDate { day, month, year })
    }

    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month, self.day)
    }
}

impl fmt::Display for TicketDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

impl FromStr for TicketDate {
    type Err = TicketDateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TicketDateParseError(s.to_string());
        let mut parts = s.trim().split('/');
        let (Some(d), Some(m), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        let all_digits = |p: &str, min: usize, max: usize| {
            (min..=max).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit())
        };
        if !all_digits(d, 1, 2) || !all_digits(m, 1, 2) || !all_digits(y, 2, 4) || y.len() == 3 {
            return Err(err());
        }
        let day = d.parse().map_err(|_| err())?;
        let month = m.parse().map_err(|_| err())?;
        TicketDate::new(day, month, y).ok_or_else(err)
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreName(String);

impl StoreName {
    pub fn new(name: impl Into<String>) -> Self {
        StoreName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Extraction results ────────────────────────────────────────────────────────

/// The three fields recovered from one OCR text. Absent means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldExtractionResult {
    pub store: Option<StoreName>,
    pub date: Option<TicketDate>,
    pub total: Option<Money>,
}

impl FieldExtractionResult {
    /// Number of fields found, 0 through 3.
    pub fn completeness(&self) -> u8 {
        u8::from(self.store.is_some()) + u8::from(self.date.is_some()) + u8::from(self.total.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.completeness() == 0
    }
}

/// Fields extracted from one OCR variant, together with the text they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionAttempt {
    pub fields: FieldExtractionResult,
    pub raw_text: String,
    pub score: u8,
}

impl ExtractionAttempt {
    pub fn new(fields: FieldExtractionResult, raw_text: impl Into<String>) -> Self {
        let score = fields.completeness();
        Self { fields, raw_text: raw_text.into(), score }
    }
}

// ── Persistence tuple ─────────────────────────────────────────────────────────

/// What gets written to the ticket store once the user has confirmed the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub store: Option<String>,
    pub date: Option<String>,
    pub total: Option<Money>,
    pub currency: String,
    pub raw_text: String,
    pub category: Option<String>,
    pub payment_method: Option<String>,
}

impl TicketRecord {
    pub fn from_fields(fields: &FieldExtractionResult, raw_text: impl Into<String>) -> Self {
        Self {
            store: fields.store.as_ref().map(|s| s.to_string()),
            date: fields.date.map(|d| d.to_string()),
            total: fields.total,
            currency: DEFAULT_CURRENCY.to_string(),
            raw_text: raw_text.into(),
            category: None,
            payment_method: None,
        }
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_year_lands_in_2000s() {
        let d = TicketDate::new(12, 11, "25").unwrap();
        assert_eq!(d.to_string(), "12/11/2025");
    }

    #[test]
    fn date_display_zero_pads() {
        let d = TicketDate::new(1, 2, "2024").unwrap();
        assert_eq!(d.to_string(), "01/02/2024");
    }

    #[test]
    fn impossible_dates_are_kept_as_read() {
        let d = TicketDate::new(31, 2, "2025").unwrap();
        assert_eq!(d.to_string(), "31/02/2025");
        assert!(d.to_naive_date().is_none());
        assert_eq!(
            TicketDate::new(15, 3, "2024").unwrap().to_naive_date(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn date_from_str() {
        assert_eq!("5/7/24".parse::<TicketDate>().unwrap().to_string(), "05/07/2024");
        assert!("2024-01-05".parse::<TicketDate>().is_err());
        assert!("1/2/345".parse::<TicketDate>().is_err());
        assert!("1/2/+5".parse::<TicketDate>().is_err());
        assert!("1/2/2024/9".parse::<TicketDate>().is_err());
    }

    #[test]
    fn completeness_counts_present_fields() {
        let mut r = FieldExtractionResult::default();
        assert_eq!(r.completeness(), 0);
        assert!(r.is_empty());
        r.store = Some(StoreName::new("OXXO"));
        r.total = Some(Money::from_cents(8800));
        assert_eq!(r.completeness(), 2);
        r.date = TicketDate::new(1, 1, "2025");
        assert_eq!(r.completeness(), 3);
    }

    #[test]
    fn attempt_scores_itself() {
        let fields = FieldExtractionResult {
            store: Some(StoreName::new("HEB")),
            ..Default::default()
        };
        let a = ExtractionAttempt::new(fields, "HEB\n");
        assert_eq!(a.score, 1);
        assert_eq!(a.raw_text, "HEB\n");
    }

    #[test]
    fn record_defaults_and_overrides() {
        let fields = FieldExtractionResult {
            store: Some(StoreName::new("Walmart")),
            date: TicketDate::new(12, 11, "2025"),
            total: None,
        };
        let rec = TicketRecord::from_fields(&fields, "raw");
        assert_eq!(rec.currency, "MXN");
        assert_eq!(rec.store.as_deref(), Some("Walmart"));
        assert_eq!(rec.date.as_deref(), Some("12/11/2025"));
        assert!(rec.total.is_none());

        let rec = rec.with_store("Walmart Express").with_total(Money::from_cents(10100));
        assert_eq!(rec.store.as_deref(), Some("Walmart Express"));
        assert_eq!(rec.total.unwrap().to_string(), "101.00");
    }
}
