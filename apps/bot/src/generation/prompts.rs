//! Prompt construction for vacancy-reply generation.

use crate::profiles::Profile;

/// System prompt. Replace `{performer_info}` before sending. The fixed
/// НАЗВАНИЕ / ТЕКСТ ОТКЛИКА format is what `generation::parser` relies on.
pub const REPLY_SYSTEM_TEMPLATE: &str = "Ты - бот, который создает ТОЛЬКО текст для отклика на вакансию и название для отклика до 100 символов. \
Ты не делаешь НИЧЕГО БОЛЕЕ, чем это. \
Ты ОБЯЗАН ответить в следующем формате:\n\n\
НАЗВАНИЕ: [название отклика до 100 символов]\n\n\
ТЕКСТ ОТКЛИКА:\n[текст отклика]\n\n\
Информация об исполнителе:\n{performer_info}\n\n\
ВАЖНЫЕ ПРАВИЛА ДЛЯ ТЕКСТА ОТКЛИКА:\n\
1. НЕ выдумывай опыт и прошлые проекты! Не пиши про 'недавно делал', 'работал с похожими задачами', 'оптимизировал системы' и т.п.\n\
2. Пиши ТОЛЬКО о реальных навыках из стека исполнителя\n\
3. Используй простой, понятный язык - пиши так, чтобы понял обычный заказчик, не только программист\n\
4. Технологии упоминай кратко и по делу, без лишних технических терминов\n\
5. Фокусируйся на том, ЧТО ты можешь сделать для заказчика СЕЙЧАС, а не на прошлом опыте\n\
6. Будь конкретным и уверенным, покажи что понимаешь задачу\n\
7. Текст должен быть коротким, дружелюбным и профессиональным одновременно\n\
8. Не используй шаблонные фразы типа 'ваша вакансия мне интересна'\n\
9. Не делай жирного текста и других HTML-тегов, только переносы строк\n\
10. Не используй длинные тире (—), только короткие дефисы (-)\n\n\
Структура отклика:\n\
- Короткое приветствие\n\
- Покажи что понял задачу (1 предложение)\n\
- Какие навыки/технологии помогут решить задачу (2-4 пункта, кратко)\n\
- Что конкретно готов сделать\n\
- Призыв к действию (обсудить детали)\n\n\
Пример хорошего стиля: 'Готов помочь с вашим парсером. Работаю с Python и знаю как обходить защиты Google.'\n\
Пример плохого стиля: 'Ваша вакансия мне близка, недавно делал похожий проект с интеграцией AI для прогнозирования паттернов.'";

/// Builds the system prompt with the performer info block filled in
/// from the stored profile.
pub fn build_system_prompt(profile: &Profile) -> String {
    let performer_info = format!(
        "Имя: {}\nПол: {}\nСтек технологий: {}",
        profile.name.as_deref().unwrap_or(""),
        profile.gender.as_deref().unwrap_or(""),
        profile.tech_stack.as_deref().unwrap_or(""),
    );
    REPLY_SYSTEM_TEMPLATE.replace("{performer_info}", &performer_info)
}

pub fn build_user_prompt(vacancy_text: &str) -> String {
    format!("Вот текст вакансии:\n\n{vacancy_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            user_id: 1,
            name: Some("Иван".to_string()),
            gender: Some("мужской".to_string()),
            tech_stack: Some("Rust, Tokio, sqlx".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn test_system_prompt_embeds_performer_info() {
        let prompt = build_system_prompt(&profile());
        assert!(prompt.contains("Имя: Иван"));
        assert!(prompt.contains("Пол: мужской"));
        assert!(prompt.contains("Стек технологий: Rust, Tokio, sqlx"));
        assert!(!prompt.contains("{performer_info}"));
    }

    #[test]
    fn test_system_prompt_pins_output_format() {
        let prompt = build_system_prompt(&profile());
        assert!(prompt.contains("НАЗВАНИЕ:"));
        assert!(prompt.contains("ТЕКСТ ОТКЛИКА:"));
    }

    #[test]
    fn test_user_prompt_wraps_vacancy_text() {
        let prompt = build_user_prompt("Нужен разработчик парсера");
        assert!(prompt.starts_with("Вот текст вакансии:"));
        assert!(prompt.ends_with("Нужен разработчик парсера"));
    }
}
