#![allow(dead_code)]

use thiserror::Error;

/// Application-level error type.
///
/// Every conversation handler returns `Result<(), BotError>`; the
/// dispatch boundary logs the error and sends the user a generic retry
/// message, so none of these ever terminate the process.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
