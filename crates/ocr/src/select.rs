//! Choosing between the preprocessed and the unmodified OCR pass.

use recibo_core::{ExtractionAttempt, FieldExtractionResult};
use serde::{Deserialize, Serialize};

use crate::extract::Extractor;

/// The winning pass of a dual-pass extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub fields: FieldExtractionResult,
    pub raw_text: String,
    pub used_preprocessed: bool,
}

/// Extract from both OCR variants of one image and keep the more complete one.
///
/// The unmodified pass must score strictly higher to be chosen; ties go to the
/// preprocessed pass.
pub fn extract_best(preprocessed_text: &str, raw_text: &str) -> Selection {
    choose(Extractor::attempt(preprocessed_text), Extractor::attempt(raw_text))
}

pub fn choose(preprocessed: ExtractionAttempt, raw: ExtractionAttempt) -> Selection {
    tracing::debug!(
        preprocessed_score = preprocessed.score,
        raw_score = raw.score,
        "dual-pass extraction scored"
    );
    let (winner, used_preprocessed) = if raw.score > preprocessed.score {
        (raw, false)
    } else {
        (preprocessed, true)
    };
    Selection {
        fields: winner.fields,
        raw_text: winner.raw_text,
        used_preprocessed,
    }
}
