//! Pure input validators for the intake conversation.
//!
//! Each failure variant's `Display` is the exact message shown to the
//! user, so handlers can send errors inline without extra formatting.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_STACK_LENGTH: usize = 10;
pub const MIN_VACANCY_LENGTH: usize = 20;

/// Cyrillic or Latin letters, whitespace, and hyphens.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[а-яА-ЯёЁa-zA-Z\s\-]+$").expect("valid name regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("❌ Имя слишком короткое. Минимум 2 символа.")]
    NameTooShort,

    #[error("❌ Имя слишком длинное. Максимум 100 символов.")]
    NameTooLong,

    #[error("❌ Имя может содержать только буквы, пробелы и дефисы.")]
    NameInvalidCharacters,

    #[error("❌ Пожалуйста, выберите 'Мужской' или 'Женский' из кнопок.")]
    GenderInvalidChoice,

    #[error("❌ Слишком короткий стек. Минимум 10 символов. Опишите подробнее ваши навыки и опыт.")]
    StackTooShort,

    #[error("❌ Текст вакансии слишком короткий (минимум 20 символов). Отправьте полное описание вакансии.")]
    VacancyTooShort,
}

/// Validates a display name: 2–100 characters, letters/spaces/hyphens
/// only. Lengths are counted in characters, not bytes.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len < MIN_NAME_LENGTH {
        return Err(ValidationError::NameTooShort);
    }
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    if !NAME_RE.is_match(name) {
        return Err(ValidationError::NameInvalidCharacters);
    }
    Ok(())
}

/// Case-insensitive match against the two accepted labels; returns the
/// normalized (lowercase) label that gets persisted.
pub fn validate_gender(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_lowercase();
    match normalized.as_str() {
        "мужской" | "женский" => Ok(normalized),
        _ => Err(ValidationError::GenderInvalidChoice),
    }
}

pub fn validate_stack(stack: &str) -> Result<(), ValidationError> {
    if stack.chars().count() < MIN_STACK_LENGTH {
        return Err(ValidationError::StackTooShort);
    }
    Ok(())
}

pub fn validate_vacancy(text: &str) -> Result<(), ValidationError> {
    if text.chars().count() < MIN_VACANCY_LENGTH {
        return Err(ValidationError::VacancyTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_two_latin_chars_ok() {
        assert!(validate_name("Jo").is_ok());
    }

    #[test]
    fn test_name_one_char_too_short() {
        assert_eq!(validate_name("J"), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn test_name_101_chars_too_long() {
        let name = "а".repeat(101);
        assert_eq!(validate_name(&name), Err(ValidationError::NameTooLong));
    }

    #[test]
    fn test_name_100_chars_ok() {
        let name = "а".repeat(100);
        assert!(validate_name(&name).is_ok());
    }

    #[test]
    fn test_name_digits_rejected() {
        assert_eq!(
            validate_name("John123"),
            Err(ValidationError::NameInvalidCharacters)
        );
    }

    #[test]
    fn test_name_cyrillic_ok() {
        assert!(validate_name("Анна-Мария Ёлкина").is_ok());
    }

    #[test]
    fn test_name_punctuation_rejected() {
        assert_eq!(
            validate_name("John_Doe"),
            Err(ValidationError::NameInvalidCharacters)
        );
    }

    #[test]
    fn test_gender_accepts_both_labels() {
        assert_eq!(validate_gender("мужской").unwrap(), "мужской");
        assert_eq!(validate_gender("женский").unwrap(), "женский");
    }

    #[test]
    fn test_gender_is_case_insensitive() {
        assert_eq!(validate_gender("Мужской").unwrap(), "мужской");
        assert_eq!(validate_gender("ЖЕНСКИЙ").unwrap(), "женский");
    }

    #[test]
    fn test_gender_rejects_anything_else() {
        assert_eq!(
            validate_gender("другое"),
            Err(ValidationError::GenderInvalidChoice)
        );
    }

    #[test]
    fn test_stack_nine_chars_too_short() {
        assert_eq!(
            validate_stack("123456789"),
            Err(ValidationError::StackTooShort)
        );
    }

    #[test]
    fn test_stack_ten_chars_ok() {
        assert!(validate_stack("1234567890").is_ok());
    }

    #[test]
    fn test_vacancy_nineteen_chars_too_short() {
        assert_eq!(
            validate_vacancy(&"x".repeat(19)),
            Err(ValidationError::VacancyTooShort)
        );
    }

    #[test]
    fn test_vacancy_twenty_chars_ok() {
        assert!(validate_vacancy(&"x".repeat(20)).is_ok());
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        assert!(ValidationError::NameTooShort.to_string().contains("Имя"));
        assert!(ValidationError::StackTooShort.to_string().contains("10"));
        assert!(ValidationError::VacancyTooShort.to_string().contains("20"));
    }
}
