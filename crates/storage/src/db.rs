use recibo_core::TicketRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

/// A ticket as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTicket {
    pub id: i64,
    pub store: Option<String>,
    pub date: Option<String>,
    pub total_cents: Option<i64>,
    pub currency: String,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub raw_text: Option<String>,
    pub created_at: String,
}

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tickets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            store TEXT,
            date TEXT,
            total_cents INTEGER,
            currency TEXT NOT NULL,
            category TEXT,
            payment_method TEXT,
            raw_text TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Append a confirmed ticket. Returns the new row id.
pub async fn insert_ticket(pool: &DbPool, ticket: &TicketRecord) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO tickets (store, date, total_cents, currency, category, payment_method, raw_text) VALUES (?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&ticket.store)
    .bind(&ticket.date)
    .bind(ticket.total.and_then(|t| t.to_cents()))
    .bind(&ticket.currency)
    .bind(&ticket.category)
    .bind(&ticket.payment_method)
    .bind(&ticket.raw_text)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent tickets first.
pub async fn recent_tickets(pool: &DbPool, limit: u32) -> Result<Vec<StoredTicket>, sqlx::Error> {
    #[allow(clippy::type_complexity)]
    let rows = sqlx::query_as::<_, (i64, Option<String>, Option<String>, Option<i64>, String, Option<String>, Option<String>, Option<String>, String)>(
        "SELECT id, store, date, total_cents, currency, category, payment_method, raw_text, created_at FROM tickets ORDER BY id DESC LIMIT ?"
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| StoredTicket {
        id: r.0,
        store: r.1,
        date: r.2,
        total_cents: r.3,
        currency: r.4,
        category: r.5,
        payment_method: r.6,
        raw_text: r.7,
        created_at: r.8,
    }).collect())
}
