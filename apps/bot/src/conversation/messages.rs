//! All user-facing message copy and reply keyboards in one place.

use crate::profiles::Profile;
use crate::transport::Keyboard;

pub const MSG_HELP: &str = "Используйте /start для начала работы с ботом.\n\
Доступные команды:\n\
/start - начать работу\n\
/mystack - посмотреть мои данные\n\
/update - обновить данные";

pub const MSG_GENERIC_ERROR: &str = "Произошла ошибка. Попробуйте еще раз.";

pub const MSG_GREETING: &str = "👋 Привет! Я бот для создания откликов на вакансии Kwork.\n\n\
Для начала работы мне нужно узнать о вас.\n\n\
Как вас зовут? (От 2 до 100 символов)";

pub const MSG_UPDATE_REJECTED: &str = "❌ Сначала заполните все данные профиля!\n\
Используйте /start для заполнения.";

pub const MSG_UPDATE_MENU: &str = "Что вы хотите обновить?\n\nВыберите из меню ниже:";

pub const MSG_UPDATE_MENU_REPROMPT: &str = "❌ Пожалуйста, выберите кнопку из меню ниже:";

pub const MSG_UPDATE_NAME_PROMPT: &str = "Введите ваше новое имя (от 2 до 100 символов):";

pub const MSG_UPDATE_GENDER_PROMPT: &str = "Укажите ваш пол:";

pub const MSG_UPDATE_STACK_PROMPT: &str =
    "📝 Отправьте обновленный стек технологий и опыт:\n\n\
Например:\n\
<code>HTML, CSS, JavaScript, TypeScript, React, Node.js\n\
3 года в веб-разработке</code>";

pub const MSG_UPDATE_ALL_PROMPT: &str = "Хорошо, давайте обновим все данные.\n\n\
Как вас зовут? (От 2 до 100 символов)";

pub const MSG_NO_DATA: &str = "У вас еще не сохранены данные.\n\
Используйте /start для начала работы.";

pub const MSG_STACK_INCOMPLETE_WARNING: &str =
    "⚠️ Заполните остальные данные профиля через /start";

pub const MSG_VACANCY_REJECTED: &str = "❌ Заполните все данные профиля!\n\
Используйте /start для заполнения.";

pub const MSG_GENERATING: &str = "⏳ Создаю отклик, подождите...";

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━";

pub fn update_menu_keyboard() -> Keyboard {
    Keyboard::Reply {
        rows: vec![
            vec!["Имя".to_string(), "Пол".to_string()],
            vec!["Стек".to_string(), "Все вместе".to_string()],
        ],
        one_time: false,
    }
}

pub fn gender_keyboard() -> Keyboard {
    Keyboard::Reply {
        rows: vec![vec!["Мужской".to_string(), "Женский".to_string()]],
        one_time: true,
    }
}

/// Lines describing whichever profile fields are currently saved.
fn profile_info(profile: &Profile) -> String {
    let mut info = String::new();
    if let Some(name) = profile.name.as_deref().filter(|s| !s.is_empty()) {
        info.push_str(&format!("👤 Имя: {name}\n"));
    }
    if let Some(gender) = profile.gender.as_deref().filter(|s| !s.is_empty()) {
        info.push_str(&format!("⚧ Пол: {gender}\n"));
    }
    if let Some(stack) = profile.tech_stack.as_deref().filter(|s| !s.is_empty()) {
        info.push_str(&format!("💼 Стек: <code>{stack}</code>\n"));
    }
    info
}

pub fn returning_user(profile: &Profile) -> String {
    format!(
        "👋 С возвращением!\n\nВаши данные:\n{}\n\
Отправьте текст вакансии, и я создам отклик.\n\
Или используйте /update чтобы обновить данные.",
        profile_info(profile)
    )
}

pub fn my_data(profile: &Profile) -> String {
    format!(
        "Ваши текущие данные:\n\n{}\nИспользуйте /update для изменения.",
        profile_info(profile)
    )
}

pub fn name_saved_ask_gender(name: &str) -> String {
    format!("✅ Имя сохранено: {name}\n\nТеперь укажите ваш пол:")
}

pub fn name_changed(name: &str) -> String {
    format!("✅ Имя успешно изменено: {name}\n\nОтправьте текст вакансии для создания отклика.")
}

pub fn gender_saved_ask_stack(gender: &str) -> String {
    format!(
        "✅ Пол сохранен: {gender}\n\n\
Теперь отправьте ваш стек технологий и опыт разработки (минимум 10 символов).\n\n\
Например:\n\
<code>HTML, CSS, JavaScript, TypeScript, React, Node.js\n\
3 года в веб-разработке</code>"
    )
}

pub fn gender_changed(gender: &str) -> String {
    format!("✅ Пол успешно изменен: {gender}\n\nОтправьте текст вакансии для создания отклика.")
}

pub fn all_fields_updated(stack: &str) -> String {
    format!(
        "✅ Все данные успешно обновлены!\n\n<code>{stack}</code>\n\n\
Теперь отправьте текст вакансии, и я создам для вас отклик!"
    )
}

pub fn first_setup_done(stack: &str) -> String {
    format!(
        "✅ Отлично! Все данные заполнены!\n\n<code>{stack}</code>\n\n\
Теперь отправьте текст вакансии, и я создам для вас отклик!"
    )
}

pub fn stack_changed(stack: &str) -> String {
    format!(
        "✅ Стек успешно изменен!\n\n<code>{stack}</code>\n\n\
Отправьте текст вакансии для создания отклика."
    )
}

pub fn reply_title_block(title: &str) -> String {
    format!("✅ Отклик готов!\n\n{DIVIDER}\n📌 НАЗВАНИЕ:\n{title}\n{DIVIDER}")
}

pub fn reply_body_block(body: &str) -> String {
    format!("{DIVIDER}\n📝 ТЕКСТ ОТКЛИКА:\n\n{body}\n{DIVIDER}\n\n💡 Выделите текст для копирования")
}
