//! Vacancy-reply generation pipeline.
//!
//! Flow: build prompts from the stored profile → call the generation
//! client (which never fails — worst case it hands back an apology
//! string) → truncate to the transport limit → marker parse.

pub mod parser;
pub mod prompts;

use tracing::info;

use crate::llm_client::ReplyGenerator;
use crate::profiles::Profile;

pub use parser::{parse_reply, truncate_reply, ParsedReply};
pub use prompts::{build_system_prompt, build_user_prompt};

/// Runs the full reply pipeline for one vacancy text.
pub async fn generate_reply(
    generator: &dyn ReplyGenerator,
    profile: &Profile,
    vacancy_text: &str,
) -> ParsedReply {
    let system_prompt = build_system_prompt(profile);
    let user_prompt = build_user_prompt(vacancy_text);

    let raw = generator.generate(&system_prompt, &user_prompt).await;
    info!(
        "Generation returned {} chars for user {}",
        raw.chars().count(),
        profile.user_id
    );

    parse_reply(&truncate_reply(raw))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct ScriptedGenerator(String);

    #[async_trait]
    impl ReplyGenerator for ScriptedGenerator {
        async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> String {
            self.0.clone()
        }
    }

    fn profile() -> Profile {
        Profile {
            user_id: 1,
            name: Some("Иван".to_string()),
            gender: Some("мужской".to_string()),
            tech_stack: Some("Rust, Tokio, sqlx".to_string()),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_pipeline_structured_output() {
        let generator =
            ScriptedGenerator("НАЗВАНИЕ: Заголовок\nТЕКСТ ОТКЛИКА:\nТело отклика".to_string());
        let reply = generate_reply(&generator, &profile(), "Нужен парсер сайтов на Rust").await;
        assert_eq!(
            reply,
            ParsedReply::Structured {
                title: "Заголовок".to_string(),
                body: "Тело отклика".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_pipeline_unmarked_output_falls_back_to_raw() {
        let generator = ScriptedGenerator("просто текст без маркеров".to_string());
        let reply = generate_reply(&generator, &profile(), "Нужен парсер сайтов на Rust").await;
        assert_eq!(reply, ParsedReply::Raw("просто текст без маркеров".to_string()));
    }

    #[tokio::test]
    async fn test_pipeline_truncates_before_parsing() {
        // Body marker sits past the 4000-char cap, so after truncation
        // the reply is no longer structured.
        let raw = format!("НАЗВАНИЕ: Т\n{}\nТЕКСТ ОТКЛИКА: тело", "ж".repeat(4200));
        let generator = ScriptedGenerator(raw);
        let reply = generate_reply(&generator, &profile(), "Нужен парсер сайтов на Rust").await;
        assert!(matches!(reply, ParsedReply::Raw(_)));
    }
}
