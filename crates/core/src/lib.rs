pub mod config;
pub mod money;
pub mod ticket;

pub use config::{Config, ConfigError, OcrConfig, PreprocessConfig};
pub use money::{Money, MoneyError};
pub use ticket::{
    ExtractionAttempt, FieldExtractionResult, StoreName, TicketDate, TicketDateParseError,
    TicketRecord, DEFAULT_CURRENCY, MAX_STORE_LEN,
};
