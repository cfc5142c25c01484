use recibo_core::{ExtractionAttempt, FieldExtractionResult};

use crate::amount::find_total;
use crate::date::find_date;
use crate::normalize::normalize;
use crate::store::find_store;

pub struct Extractor;

impl Extractor {
    /// Extract store, date and total from one raw OCR text.
    ///
    /// Amount and date are searched in the normalized text; the store scan works
    /// line by line on the raw text.
    pub fn extract(ocr_text: &str) -> FieldExtractionResult {
        let text_norm = normalize(ocr_text);
        FieldExtractionResult {
            store: find_store(ocr_text),
            date: find_date(&text_norm),
            total: find_total(&text_norm),
        }
    }

    pub fn attempt(ocr_text: &str) -> ExtractionAttempt {
        ExtractionAttempt::new(Self::extract(ocr_text), ocr_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OXXO_TICKET: &str = "\
OXXO TIENDA MITRAS
Av. Simón Bolívar 455
Col. Mitras Centro, Monterrey N.L.
FECHA 12/11/25  HORA 18:04
COCA COLA 600ML        18.50
SABRITAS               21.00
SUBTOTAL               39.50
TOTAL                $ 39.50
EFECTIVO               50.00
CAMBIO                 10.50
";

    #[test]
    fn full_ticket() {
        let r = Extractor::extract(OXXO_TICKET);
        assert_eq!(r.store.unwrap().as_str(), "OXXO");
        assert_eq!(r.date.unwrap().to_string(), "12/11/2025");
        assert_eq!(r.total.unwrap().to_string(), "39.50");
    }

    #[test]
    fn textual_date_and_european_total() {
        let text = "Cafetería La Parroquia\n12 nov 2025\nIMPORTE TOTAL: 1.234,56";
        let r = Extractor::extract(text);
        assert_eq!(r.store.unwrap().as_str(), "Cafetería La Parroquia");
        assert_eq!(r.date.unwrap().to_string(), "12/11/2025");
        assert_eq!(r.total.unwrap().to_string(), "1234.56");
    }

    #[test]
    fn empty_text_finds_nothing() {
        let r = Extractor::extract("");
        assert!(r.is_empty());
    }

    #[test]
    fn garbage_does_not_panic() {
        let r = Extractor::extract("!@#%^&*()\n\0\x01\x02|||");
        assert!(r.total.is_none());
        assert!(r.date.is_none());
    }

    #[test]
    fn attempt_carries_text_and_score() {
        let a = Extractor::attempt("HEB\nTOTAL 10.00");
        assert_eq!(a.score, 2);
        assert_eq!(a.raw_text, "HEB\nTOTAL 10.00");
    }
}
