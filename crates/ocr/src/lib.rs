// Lazily compiled regex, one static per pattern.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod amount;
pub mod date;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod select;
pub mod store;

pub use amount::find_total;
pub use date::find_date;
pub use extract::Extractor;
pub use normalize::normalize;
pub use pipeline::{is_image_path, spawn_intake_watcher, PipelineError, ReceiptPipeline};
pub use preprocess::{binarize_for_ocr, prepare_raw_for_ocr, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use select::{extract_best, Selection};
pub use store::find_store;
