//! Тексты ответов администратору. Подсказки диалога размечены HTML.

use crate::broadcast::BroadcastState;
use crate::fanout::BroadcastReport;
use crate::registry::RegistryError;

pub const ACCESS_DENIED: &str = "⛔ У вас нет доступа.";
pub const ASK_PHOTO_PROMPT: &str =
    "📢 Хочешь прикрепить картинку к рассылке? Напиши <b>да</b> или <b>нет</b>.";
pub const WAIT_PHOTO_PROMPT: &str = "🖼 Пришли фото для рассылки:";
pub const FINAL_TEXT_PROMPT: &str = "✍️ Введи текст для рассылки:";
pub const CAPTION_PROMPT: &str = "✍️ Теперь введи подпись к фото:";
pub const CANCELLED: &str = "❌ Рассылка отменена.";
pub const NOTHING_TO_CANCEL: &str = "Нечего отменять.";
pub const REGISTRY_UNAVAILABLE: &str =
    "⚠️ Не удалось прочитать список пользователей, рассылка не отправлена.";
pub const EXPIRED: &str = "⌛ Время на подготовку рассылки истекло. Начни заново: /broadcast";

/// Подсказка при неподходящем вводе в текущем состоянии.
pub fn reprompt_text(state: &BroadcastState) -> &'static str {
    match state {
        BroadcastState::Idle => NOTHING_TO_CANCEL,
        BroadcastState::AskPhoto { .. } => {
            "Ответь <b>да</b> или <b>нет</b>. Отменить рассылку: /cancel"
        }
        BroadcastState::WaitPhoto { .. } => {
            "Жду фото для рассылки. Отменить рассылку: /cancel"
        }
        BroadcastState::WaitText { .. } => {
            "Жду текст подписи к фото. Отменить рассылку: /cancel"
        }
        BroadcastState::FinalText { .. } => {
            "Жду текст рассылки. Отменить рассылку: /cancel"
        }
    }
}

pub fn render_report(report: &BroadcastReport) -> String {
    let mut text = format!(
        "✅ Рассылка завершена! Отправлено {} пользователям.",
        report.sent()
    );
    let failed = report.failed();
    if failed > 0 {
        text.push_str(&format!("\nНе доставлено: {}.", failed));
    }
    text
}

/// Итог рассылки для администратора, в том числе при недоступном реестре.
pub fn broadcast_reply(outcome: &Result<BroadcastReport, RegistryError>) -> String {
    match outcome {
        Ok(report) => render_report(report),
        Err(_) => REGISTRY_UNAVAILABLE.to_string(),
    }
}
