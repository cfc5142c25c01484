use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use recibo_core::PreprocessConfig;

use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};
use crate::select::{self, Selection};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Orchestrates: decode → two renderings → OCR each → pick the more complete extraction.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    preprocess: PreprocessConfig,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, preprocess: PreprocessConfig) -> Self {
        Self { recognizer, preprocess }
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<Selection, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw image bytes (JPEG / PNG / …).
    pub fn process_bytes(&self, data: &[u8]) -> Result<Selection, PipelineError> {
        // 1. Binarized rendering, then the photo as-is.
        let binarized = preprocess::binarize_for_ocr(data, &self.preprocess)?;
        let unmodified = preprocess::prepare_raw_for_ocr(data, self.preprocess.max_dimension)?;

        // 2. OCR both.
        let preprocessed_text = self.recognizer.recognize(&binarized)?;
        let raw_text = self.recognizer.recognize(&unmodified)?;

        // 3. Extract from both and keep the better one.
        let selection = select::extract_best(&preprocessed_text, &raw_text);
        tracing::debug!(
            used_preprocessed = selection.used_preprocessed,
            fields = selection.fields.completeness(),
            "receipt extracted"
        );
        Ok(selection)
    }
}

impl<R: OcrBackend + 'static> ReceiptPipeline<R> {
    /// Like [`ReceiptPipeline::process_file`], but decoding and OCR run on the
    /// blocking thread pool so the async runtime stays responsive.
    pub async fn process_file_blocking(self: Arc<Self>, path: &Path) -> Result<Selection, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        tokio::task::spawn_blocking(move || self.process_bytes(&bytes)).await?
    }
}

// ── Watch-folder integration ──────────────────────────────────────────────────

/// Spawn a notify watcher on `watch_dir` that sends new file paths to `tx`.
/// Returns the watcher — it must be kept alive for watching to continue.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if matches!(ev.kind, EventKind::Create(_)) {
                for path in ev.paths.into_iter().filter(|p| is_image_path(p)) {
                    if tx.try_send(path).is_err() {
                        tracing::warn!("intake queue full or closed; dropping event");
                    }
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
