//! The conversation engine — dispatches every inbound message against
//! the current session state and drives the intake/update/generation
//! flow.
//!
//! Dispatch order: slash-commands first, then the session state, then
//! the no-state catch-all. Session state is only advanced after all
//! storage writes for the step succeed; any handler error is caught at
//! the dispatch boundary, logged, and answered with a generic retry
//! message, so a failure never corrupts the conversation or kills the
//! process.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{error, info};

use crate::conversation::{messages, ChatState, SessionStore};
use crate::errors::BotError;
use crate::generation::{generate_reply, ParsedReply};
use crate::llm_client::ReplyGenerator;
use crate::profiles;
use crate::transport::{ChatTransport, Keyboard, Outbound};
use crate::validation::{validate_gender, validate_name, validate_stack, validate_vacancy};

/// Pause between the title and body messages so clients render them as
/// two distinct bubbles.
const REPLY_SPLIT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy)]
enum Command {
    Start,
    Update,
    MyStack,
}

/// Matches the leading token of a message against the known commands,
/// tolerating `/start@botname` style suffixes. Unknown slash-commands
/// fall through to the state handlers as ordinary text.
fn command_of(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let cmd = first.strip_prefix('/')?;
    let cmd = cmd.split('@').next().unwrap_or(cmd);
    match cmd {
        "start" => Some(Command::Start),
        "update" => Some(Command::Update),
        "mystack" => Some(Command::MyStack),
        _ => None,
    }
}

pub struct Engine {
    pool: SqlitePool,
    sessions: SessionStore,
    generator: Arc<dyn ReplyGenerator>,
    transport: Arc<dyn ChatTransport>,
}

impl Engine {
    pub fn new(
        pool: SqlitePool,
        generator: Arc<dyn ReplyGenerator>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            pool,
            sessions: SessionStore::new(),
            generator,
            transport,
        }
    }

    /// Entry point for one inbound message. Never returns an error:
    /// failures are logged and the user gets a generic retry message.
    pub async fn handle_message(&self, user_id: i64, text: &str) {
        if let Err(e) = self.dispatch(user_id, text).await {
            error!("Handler failed for user {user_id}: {e}");
            let _ = self
                .transport
                .send(user_id, Outbound::text(messages::MSG_GENERIC_ERROR))
                .await;
        }
    }

    async fn dispatch(&self, user_id: i64, text: &str) -> Result<(), BotError> {
        let text = text.trim();

        match command_of(text) {
            Some(Command::Start) => return self.cmd_start(user_id).await,
            Some(Command::Update) => return self.cmd_update(user_id).await,
            Some(Command::MyStack) => return self.cmd_mystack(user_id).await,
            None => {}
        }

        let session = self.sessions.snapshot(user_id);
        match session.state {
            Some(ChatState::AwaitingName) => {
                self.on_name(user_id, text, session.updating_all).await
            }
            Some(ChatState::AwaitingGender) => {
                self.on_gender(user_id, text, session.updating_all).await
            }
            Some(ChatState::AwaitingStack) => {
                self.on_stack(user_id, text, session.updating_all).await
            }
            Some(ChatState::ReadyForVacancy) => self.on_vacancy(user_id, text).await,
            Some(ChatState::ChoosingUpdateTarget) => self.on_update_choice(user_id, text).await,
            None => {
                self.send(user_id, Outbound::text(messages::MSG_HELP))
                    .await
            }
        }
    }

    async fn send(&self, user_id: i64, message: Outbound) -> Result<(), BotError> {
        self.transport.send(user_id, message).await
    }

    async fn cmd_start(&self, user_id: i64) -> Result<(), BotError> {
        info!("User {user_id} issued /start");

        let profile = profiles::get_profile(&self.pool, user_id).await?;
        match profile.filter(|p| p.is_complete()) {
            Some(profile) => {
                self.send(
                    user_id,
                    Outbound::html(messages::returning_user(&profile))
                        .with_keyboard(Keyboard::Remove),
                )
                .await?;
                self.sessions
                    .set_state(user_id, Some(ChatState::ReadyForVacancy));
            }
            None => {
                self.send(
                    user_id,
                    Outbound::text(messages::MSG_GREETING).with_keyboard(Keyboard::Remove),
                )
                .await?;
                self.sessions
                    .set_state(user_id, Some(ChatState::AwaitingName));
            }
        }
        Ok(())
    }

    async fn cmd_update(&self, user_id: i64) -> Result<(), BotError> {
        if !profiles::is_complete(&self.pool, user_id).await? {
            // State deliberately unchanged.
            return self
                .send(
                    user_id,
                    Outbound::text(messages::MSG_UPDATE_REJECTED).with_keyboard(Keyboard::Remove),
                )
                .await;
        }

        self.send(
            user_id,
            Outbound::text(messages::MSG_UPDATE_MENU)
                .with_keyboard(messages::update_menu_keyboard()),
        )
        .await?;
        self.sessions
            .set_state(user_id, Some(ChatState::ChoosingUpdateTarget));
        Ok(())
    }

    async fn cmd_mystack(&self, user_id: i64) -> Result<(), BotError> {
        let message = match profiles::get_profile(&self.pool, user_id).await? {
            Some(profile) => Outbound::html(messages::my_data(&profile)),
            None => Outbound::text(messages::MSG_NO_DATA),
        };
        self.send(user_id, message).await
    }

    async fn on_update_choice(&self, user_id: i64, text: &str) -> Result<(), BotError> {
        match text.to_lowercase().as_str() {
            "имя" => {
                self.send(
                    user_id,
                    Outbound::text(messages::MSG_UPDATE_NAME_PROMPT)
                        .with_keyboard(Keyboard::Remove),
                )
                .await?;
                self.sessions
                    .set_state(user_id, Some(ChatState::AwaitingName));
            }
            "пол" => {
                self.send(
                    user_id,
                    Outbound::text(messages::MSG_UPDATE_GENDER_PROMPT)
                        .with_keyboard(messages::gender_keyboard()),
                )
                .await?;
                self.sessions
                    .set_state(user_id, Some(ChatState::AwaitingGender));
            }
            "стек" => {
                self.send(
                    user_id,
                    Outbound::html(messages::MSG_UPDATE_STACK_PROMPT)
                        .with_keyboard(Keyboard::Remove),
                )
                .await?;
                self.sessions
                    .set_state(user_id, Some(ChatState::AwaitingStack));
            }
            "все вместе" => {
                self.send(
                    user_id,
                    Outbound::text(messages::MSG_UPDATE_ALL_PROMPT)
                        .with_keyboard(Keyboard::Remove),
                )
                .await?;
                self.sessions.set_updating_all(user_id, true);
                self.sessions
                    .set_state(user_id, Some(ChatState::AwaitingName));
            }
            _ => {
                self.send(
                    user_id,
                    Outbound::text(messages::MSG_UPDATE_MENU_REPROMPT)
                        .with_keyboard(messages::update_menu_keyboard()),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn on_name(&self, user_id: i64, text: &str, updating_all: bool) -> Result<(), BotError> {
        if let Err(e) = validate_name(text) {
            return self.send(user_id, Outbound::text(e.to_string())).await;
        }

        profiles::update_fields(&self.pool, user_id, Some(text), None).await?;
        let complete = profiles::is_complete(&self.pool, user_id).await?;

        if updating_all || !complete {
            self.send(
                user_id,
                Outbound::text(messages::name_saved_ask_gender(text))
                    .with_keyboard(messages::gender_keyboard()),
            )
            .await?;
            self.sessions
                .set_state(user_id, Some(ChatState::AwaitingGender));
        } else {
            self.send(
                user_id,
                Outbound::text(messages::name_changed(text)).with_keyboard(Keyboard::Remove),
            )
            .await?;
            self.sessions
                .set_state(user_id, Some(ChatState::ReadyForVacancy));
        }
        Ok(())
    }

    async fn on_gender(
        &self,
        user_id: i64,
        text: &str,
        updating_all: bool,
    ) -> Result<(), BotError> {
        let gender = match validate_gender(text) {
            Ok(gender) => gender,
            Err(e) => {
                return self
                    .send(
                        user_id,
                        Outbound::text(e.to_string()).with_keyboard(messages::gender_keyboard()),
                    )
                    .await;
            }
        };

        profiles::update_fields(&self.pool, user_id, None, Some(&gender)).await?;

        let rest_is_set = profiles::get_profile(&self.pool, user_id)
            .await?
            .map(|p| p.has_name_and_stack())
            .unwrap_or(false);

        if updating_all || !rest_is_set {
            self.send(
                user_id,
                Outbound::html(messages::gender_saved_ask_stack(&gender))
                    .with_keyboard(Keyboard::Remove),
            )
            .await?;
            self.sessions
                .set_state(user_id, Some(ChatState::AwaitingStack));
        } else {
            self.send(
                user_id,
                Outbound::text(messages::gender_changed(&gender)).with_keyboard(Keyboard::Remove),
            )
            .await?;
            self.sessions
                .set_state(user_id, Some(ChatState::ReadyForVacancy));
        }
        Ok(())
    }

    async fn on_stack(&self, user_id: i64, text: &str, updating_all: bool) -> Result<(), BotError> {
        if let Err(e) = validate_stack(text) {
            return self.send(user_id, Outbound::text(e.to_string())).await;
        }

        // Read before the write so the confirmation can distinguish a
        // first-time setup from an update of an existing stack.
        let previous = profiles::get_profile(&self.pool, user_id).await?;
        profiles::upsert_stack(&self.pool, user_id, text).await?;

        if updating_all {
            self.sessions.set_updating_all(user_id, false);
            self.send(
                user_id,
                Outbound::html(messages::all_fields_updated(text)).with_keyboard(Keyboard::Remove),
            )
            .await?;
        } else if profiles::is_complete(&self.pool, user_id).await? {
            let first_setup = previous
                .map(|p| p.tech_stack.as_deref().unwrap_or("").is_empty())
                .unwrap_or(true);
            let confirmation = if first_setup {
                messages::first_setup_done(text)
            } else {
                messages::stack_changed(text)
            };
            self.send(
                user_id,
                Outbound::html(confirmation).with_keyboard(Keyboard::Remove),
            )
            .await?;
        } else {
            // Name or gender still missing; stay in AwaitingStack.
            return self
                .send(
                    user_id,
                    Outbound::text(messages::MSG_STACK_INCOMPLETE_WARNING)
                        .with_keyboard(Keyboard::Remove),
                )
                .await;
        }

        self.sessions
            .set_state(user_id, Some(ChatState::ReadyForVacancy));
        Ok(())
    }

    async fn on_vacancy(&self, user_id: i64, text: &str) -> Result<(), BotError> {
        let profile = profiles::get_profile(&self.pool, user_id)
            .await?
            .filter(|p| p.is_complete());
        let profile = match profile {
            Some(profile) => profile,
            None => {
                return self
                    .send(
                        user_id,
                        Outbound::text(messages::MSG_VACANCY_REJECTED)
                            .with_keyboard(Keyboard::Remove),
                    )
                    .await;
            }
        };

        if let Err(e) = validate_vacancy(text) {
            return self.send(user_id, Outbound::text(e.to_string())).await;
        }

        self.send(user_id, Outbound::text(messages::MSG_GENERATING))
            .await?;

        match generate_reply(self.generator.as_ref(), &profile, text).await {
            ParsedReply::Structured { title, body } => {
                self.send(user_id, Outbound::text(messages::reply_title_block(&title)))
                    .await?;
                tokio::time::sleep(REPLY_SPLIT_DELAY).await;
                self.send(user_id, Outbound::text(messages::reply_body_block(&body)))
                    .await?;
            }
            ParsedReply::Raw(raw) => {
                self.send(user_id, Outbound::text(raw)).await?;
            }
        }

        info!("Reply generated for user {user_id}");
        // Steady state: stays ReadyForVacancy for the next vacancy.
        Ok(())
    }

    #[cfg(test)]
    fn state_of(&self, user_id: i64) -> Option<ChatState> {
        self.sessions.snapshot(user_id).state
    }

    #[cfg(test)]
    fn updating_all(&self, user_id: i64) -> bool {
        self.sessions.snapshot(user_id).updating_all
    }
}
