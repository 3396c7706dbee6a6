//! Inline-клавиатуры панелей.

use crate::content::BonusOffer;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CB_MAIN: &str = "main";
pub const CB_STATS: &str = "stats";
pub const CB_HOW: &str = "how";
pub const CB_BOOKMAKERS: &str = "bookmakers";

pub const BTN_STATS: &str = "📊 Статистика";
pub const BTN_HOW: &str = "⚡ Как получить прогноз?";
pub const BTN_BOOKMAKERS: &str = "🎁 Бонус от партнёров";
pub const BTN_HOME: &str = "🏠 На главный экран";
pub const BTN_BACK: &str = "↩ Назад в меню";
pub const BTN_BACK_FROM_BONUS: &str = "↩ Вернуться в меню";

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default()
        .append_row(vec![InlineKeyboardButton::callback(BTN_STATS, CB_STATS)])
        .append_row(vec![InlineKeyboardButton::callback(BTN_HOW, CB_HOW)])
        .append_row(vec![InlineKeyboardButton::callback(
            BTN_BOOKMAKERS,
            CB_BOOKMAKERS,
        )])
        .append_row(vec![InlineKeyboardButton::callback(BTN_HOME, CB_MAIN)])
}

pub fn back_to_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default()
        .append_row(vec![InlineKeyboardButton::callback(BTN_BACK, CB_MAIN)])
}

/// Кнопки-ссылки на бонусы партнёров. Оффер с некорректным URL пропускается.
pub fn bonus_offers(offers: &[BonusOffer]) -> InlineKeyboardMarkup {
    let mut keyboard = InlineKeyboardMarkup::default();
    for offer in offers {
        match offer.url.parse() {
            Ok(url) => {
                keyboard = keyboard.append_row(vec![InlineKeyboardButton::url(
                    offer.text.clone(),
                    url,
                )]);
            }
            Err(error) => {
                tracing::warn!(
                    text = %offer.text,
                    url = %offer.url,
                    error = %error,
                    "Skipping bonus button with invalid URL"
                );
            }
        }
    }
    keyboard.append_row(vec![InlineKeyboardButton::callback(
        BTN_BACK_FROM_BONUS,
        CB_MAIN,
    )])
}
