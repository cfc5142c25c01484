use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes and return the recognized text, which
/// may be empty or garbled.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset text regardless of the image.
///
/// With several texts, successive calls walk through them and the last one
/// repeats, so a dual-pass run can see a different text per variant.
pub struct MockRecognizer {
    texts: Vec<String>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self::sequence([text.into()])
    }

    pub fn sequence<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        let idx = n.min(self.texts.len().saturating_sub(1));
        Ok(self.texts.get(idx).cloned().unwrap_or_default())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::{LepTess, Variable};
    use recibo_core::OcrConfig;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
        psm: u8,
    }

    impl TesseractRecognizer {
        pub fn new(config: &OcrConfig) -> Self {
            Self {
                data_path: config.data_path.clone(),
                lang: config.language.clone(),
                psm: config.page_segmentation_mode,
            }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, &self.psm.to_string())
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
