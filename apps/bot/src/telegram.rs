//! Thin Telegram Bot API wrapper: message delivery, long polling, and
//! command registration. All conversation logic lives in the engine;
//! this module only moves JSON over HTTPS.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::conversation::Engine;
use crate::errors::BotError;
use crate::transport::{ChatTransport, Keyboard, Outbound};

const API_BASE: &str = "https://api.telegram.org";
/// Long-poll window requested from getUpdates.
const POLL_TIMEOUT_SECS: u64 = 30;
/// Wait before retrying after a failed getUpdates call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub from: Option<Sender>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl IncomingMessage {
    /// Telegram private chats share the chat id with the sender id;
    /// prefer the explicit sender when present.
    fn user_id(&self) -> i64 {
        self.from.as_ref().map(|s| s.id).unwrap_or(self.chat.id)
    }
}

pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: Client::builder()
                // Must comfortably exceed the long-poll window.
                .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 20))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: format!("{API_BASE}/bot{token}"),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<T, BotError> {
        let envelope: ApiEnvelope<T> = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.ok {
            return Err(BotError::Telegram(format!(
                "{method} failed: {}",
                envelope.description.unwrap_or_else(|| "unknown".to_string())
            )));
        }
        envelope
            .result
            .ok_or_else(|| BotError::Telegram(format!("{method} returned no result")))
    }

    /// Registers the command menu. Failure here is inconvenient, not
    /// fatal; the caller decides whether to just log it.
    pub async fn set_my_commands(&self) -> Result<(), BotError> {
        let _: Value = self
            .call(
                "setMyCommands",
                json!({
                    "commands": [
                        {"command": "start", "description": "🚀 Начать работу с ботом"},
                        {"command": "mystack", "description": "📋 Посмотреть мои данные"},
                        {"command": "update", "description": "✏️ Обновить данные"},
                    ]
                }),
            )
            .await?;
        info!("Bot commands registered");
        Ok(())
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    async fn send_message(&self, chat_id: i64, message: &Outbound) -> Result<(), BotError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": message.text,
        });
        if message.html {
            body["parse_mode"] = json!("HTML");
        }
        if let Some(markup) = reply_markup(&message.keyboard) {
            body["reply_markup"] = markup;
        }

        let _: Value = self.call("sendMessage", body).await?;
        Ok(())
    }
}

fn reply_markup(keyboard: &Keyboard) -> Option<Value> {
    match keyboard {
        Keyboard::None => None,
        Keyboard::Remove => Some(json!({"remove_keyboard": true})),
        Keyboard::Reply { rows, one_time } => {
            let rows: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| row.iter().map(|label| json!({"text": label})).collect())
                .collect();
            Some(json!({
                "keyboard": rows,
                "resize_keyboard": true,
                "one_time_keyboard": one_time,
            }))
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, user_id: i64, message: Outbound) -> Result<(), BotError> {
        self.send_message(user_id, &message).await
    }
}

/// Long-polling loop. Each inbound text message is handled in its own
/// task so one user's slow generation call never blocks the others.
pub async fn run_polling(client: Arc<TelegramClient>, engine: Arc<Engine>) -> anyhow::Result<()> {
    info!("Starting Telegram long polling");
    let mut offset: i64 = 0;

    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {e}; retrying in {POLL_RETRY_DELAY:?}");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let user_id = message.user_id();
            let Some(text) = message.text else {
                continue;
            };

            let engine = engine.clone();
            tokio::spawn(async move {
                engine.handle_message(user_id, &text).await;
            });
        }
    }
}
