use anyhow::{bail, Context as _};
use clap::Args;
use recibo_core::{Config, Money, MoneyError, TicketDate, TicketRecord};
use recibo_ocr::{OcrBackend, ReceiptPipeline, Selection};
use recibo_storage::{DbPool, StoredTicket};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

const ABSENT: &str = "—";

/// Resolved configuration plus the directory that holds the database and intake folder.
pub struct Context {
    pub config: Config,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "recibo", "Recibo")
            .context("cannot determine the user data directory")?;
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(&dirs.config_dir().join("recibo.toml"))?,
        };
        Ok(Self { config, data_dir: dirs.data_dir().to_path_buf() })
    }

    fn database_path(&self) -> PathBuf {
        self.config.database_path(&self.data_dir)
    }

    async fn open_db(&self) -> anyhow::Result<DbPool> {
        let path = self.database_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        recibo_storage::create_db(&path)
            .await
            .with_context(|| format!("cannot open database {}", path.display()))
    }

    fn pipeline(&self) -> anyhow::Result<Arc<ReceiptPipeline<Box<dyn OcrBackend>>>> {
        Ok(Arc::new(ReceiptPipeline::new(recognizer(&self.config)?, self.config.preprocess)))
    }
}

#[cfg(feature = "tesseract")]
fn recognizer(config: &Config) -> anyhow::Result<Box<dyn OcrBackend>> {
    use recibo_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    Ok(Box::new(TesseractRecognizer::new(&config.ocr)))
}

#[cfg(not(feature = "tesseract"))]
fn recognizer(_config: &Config) -> anyhow::Result<Box<dyn OcrBackend>> {
    Err(recibo_ocr::OcrError::NotAvailable.into())
}

// ── Field edits ───────────────────────────────────────────────────────────────

/// Values typed by the user that replace what was extracted.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// Store name to save instead of the detected one
    #[arg(long)]
    store: Option<String>,
    /// Date to save, as DD/MM/YYYY
    #[arg(long)]
    date: Option<String>,
    /// Total to save, e.g. 101.00 or 101,00
    #[arg(long)]
    total: Option<String>,
    /// Currency tag (default from config)
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    payment_method: Option<String>,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Print the preview without saving
    #[arg(long)]
    no_save: bool,
    /// Print the extraction as JSON
    #[arg(long)]
    json: bool,
    /// Also print the OCR text the fields came from
    #[arg(long)]
    show_text: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Receipt photo (JPEG, PNG, ...)
    image: PathBuf,
    #[command(flatten)]
    edits: EditArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// OCR text of the binarized image
    preprocessed: PathBuf,
    /// OCR text of the unmodified image
    raw: Option<PathBuf>,
    #[command(flatten)]
    edits: EditArgs,
    #[command(flatten)]
    output: OutputArgs,
}

/// A user-typed total: `,` is accepted as the decimal point.
pub fn parse_user_total(input: &str) -> Result<Money, MoneyError> {
    input.trim().replace(',', ".").parse()
}

pub fn apply_edits(mut record: TicketRecord, edits: &EditArgs) -> anyhow::Result<TicketRecord> {
    if let Some(store) = non_empty(&edits.store) {
        record = record.with_store(store);
    }
    if let Some(date) = non_empty(&edits.date) {
        let date: TicketDate = date.parse()?;
        record = record.with_date(date.to_string());
    }
    if let Some(total) = non_empty(&edits.total) {
        let total = parse_user_total(total).context("invalid total, expected e.g. 101.00")?;
        record = record.with_total(total);
    }
    if let Some(currency) = non_empty(&edits.currency) {
        record = record.with_currency(currency);
    }
    if let Some(category) = non_empty(&edits.category) {
        record = record.with_category(category);
    }
    if let Some(method) = non_empty(&edits.payment_method) {
        record = record.with_payment_method(method);
    }
    Ok(record)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn preview(record: &TicketRecord) -> String {
    let total = record
        .total
        .map(|t| format!("{t} {}", record.currency))
        .unwrap_or_else(|| format!("{ABSENT} {}", record.currency));
    format!(
        "Store: {}\nDate:  {}\nTotal: {}",
        record.store.as_deref().unwrap_or(ABSENT),
        record.date.as_deref().unwrap_or(ABSENT),
        total,
    )
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub async fn init(ctx: &Context) -> anyhow::Result<()> {
    ctx.open_db().await?;
    println!("Database ready at {}", ctx.database_path().display());
    Ok(())
}

pub async fn scan(ctx: &Context, args: ScanArgs) -> anyhow::Result<()> {
    ensure_image(&args.image)?;
    let pipeline = ctx.pipeline()?;
    let selection = pipeline
        .process_file_blocking(&args.image)
        .await
        .with_context(|| format!("cannot process {}", args.image.display()))?;
    finish(ctx, selection, &args.edits, &args.output).await
}

pub async fn extract(ctx: &Context, args: ExtractArgs) -> anyhow::Result<()> {
    let preprocessed = read_text(&args.preprocessed)?;
    let raw = match &args.raw {
        Some(path) => read_text(path)?,
        None => String::new(),
    };
    let selection = recibo_ocr::extract_best(&preprocessed, &raw);
    finish(ctx, selection, &args.edits, &args.output).await
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

async fn finish(
    ctx: &Context,
    selection: Selection,
    edits: &EditArgs,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    if selection.fields.is_empty() {
        tracing::warn!("no store, date or total found; pass them with --store/--date/--total");
    }
    if output.json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
    }

    let record = TicketRecord::from_fields(&selection.fields, selection.raw_text.as_str())
        .with_currency(ctx.config.currency.as_str());
    let record = apply_edits(record, edits)?;

    if !output.json {
        println!("{}", preview(&record));
        let source = if selection.used_preprocessed { "binarized" } else { "unmodified" };
        println!("Image: {source}");
    }
    if output.show_text {
        println!("\n{}", selection.raw_text);
    }
    if output.no_save {
        return Ok(());
    }

    let pool = ctx.open_db().await?;
    let id = recibo_storage::insert_ticket(&pool, &record).await?;
    tracing::info!(id, "ticket saved");
    Ok(())
}

pub async fn watch(ctx: &Context) -> anyhow::Result<()> {
    let intake_dir = ctx.config.intake_path(&ctx.data_dir);
    std::fs::create_dir_all(&intake_dir)
        .with_context(|| format!("cannot create {}", intake_dir.display()))?;

    let pool = ctx.open_db().await?;
    let pipeline = ctx.pipeline()?;

    // The channel bridges the notify watcher thread and the async processor.
    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    // The watcher must be kept alive for the duration of the loop.
    let _watcher = recibo_ocr::spawn_intake_watcher(&intake_dir, tx)
        .context("cannot watch the intake folder")?;
    tracing::info!("Watching intake folder: {}", intake_dir.display());

    while let Some(path) = rx.recv().await {
        tracing::info!("Processing receipt: {}", path.display());
        let selection = match Arc::clone(&pipeline).process_file_blocking(&path).await {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!("Receipt pipeline error: {e}");
                continue;
            }
        };
        let record = TicketRecord::from_fields(&selection.fields, selection.raw_text)
            .with_currency(ctx.config.currency.as_str());
        if let Err(e) = save_watched(&pool, &record).await {
            tracing::warn!("Could not save {}: {e}", path.display());
        }
    }
    Ok(())
}

/// Insert one watched ticket; failures are returned for the caller to log.
async fn save_watched(pool: &DbPool, record: &TicketRecord) -> Result<i64, recibo_storage::StorageError> {
    let id = recibo_storage::insert_ticket(pool, record).await?;
    tracing::info!(id, fields = %record_summary(record), "ticket saved");
    Ok(id)
}

fn record_summary(record: &TicketRecord) -> String {
    preview(record).replace('\n', " | ")
}

pub async fn list(ctx: &Context, limit: u32) -> anyhow::Result<()> {
    let pool = ctx.open_db().await?;
    let tickets = recibo_storage::recent_tickets(&pool, limit).await?;
    if tickets.is_empty() {
        println!("No tickets saved yet.");
        return Ok(());
    }
    for t in &tickets {
        println!("{}", list_line(t));
    }
    Ok(())
}

fn list_line(t: &StoredTicket) -> String {
    let total = match t.total_cents {
        Some(cents) if cents >= 0 => format!("{}.{:02}", cents / 100, cents % 100),
        _ => ABSENT.to_string(),
    };
    format!(
        "#{:<5} {}  {:<30} {:<10} {:>12} {}",
        t.id,
        t.created_at,
        t.store.as_deref().unwrap_or(ABSENT),
        t.date.as_deref().unwrap_or(ABSENT),
        total,
        t.currency,
    )
}

fn ensure_image(path: &Path) -> anyhow::Result<()> {
    if !recibo_ocr::is_image_path(path) {
        bail!("{} does not look like an image file", path.display());
    }
    Ok(())
}
