//! Chat transport boundary.
//!
//! The engine only ever talks to a `ChatTransport`: it sends outbound
//! text (optionally with a reply keyboard) to a user id. The Telegram
//! implementation lives in `telegram.rs`; tests use a recording fake.

use async_trait::async_trait;

use crate::errors::BotError;

/// Reply-keyboard request attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard is currently shown.
    None,
    /// Hide any custom keyboard.
    Remove,
    /// Show rows of one-tap reply buttons.
    Reply {
        rows: Vec<Vec<String>>,
        one_time: bool,
    },
}

/// One outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub text: String,
    pub keyboard: Keyboard,
    /// Render with HTML markup (used for <code> blocks around stacks).
    pub html: bool,
}

impl Outbound {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::None,
            html: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::None,
            html: true,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, user_id: i64, message: Outbound) -> Result<(), BotError>;
}
