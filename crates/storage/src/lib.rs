pub mod db;

pub use db::{create_db, insert_ticket, recent_tickets, DbPool, StoredTicket};

/// Error type of every storage call.
pub use sqlx::Error as StorageError;
