//! Панели меню: главный экран и три подраздела.

use crate::bot::keyboards::{self, CB_BOOKMAKERS, CB_HOW, CB_MAIN, CB_STATS};
use crate::content::Content;
use teloxide::types::InlineKeyboardMarkup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Main,
    Stats,
    How,
    Bookmakers,
}

impl Panel {
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            CB_MAIN => Some(Panel::Main),
            CB_STATS => Some(Panel::Stats),
            CB_HOW => Some(Panel::How),
            CB_BOOKMAKERS => Some(Panel::Bookmakers),
            _ => None,
        }
    }
}

/// Фото-панели показывают общий логотип с подписью (до 1024 символов),
/// текстовые панели — обычное сообщение (до 4096 символов).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Photo,
    Text,
}

#[derive(Debug, Clone)]
pub struct PanelView {
    pub kind: PanelKind,
    pub caption: String,
    pub keyboard: InlineKeyboardMarkup,
}

pub fn render_panel(panel: Panel, content: &Content) -> PanelView {
    match panel {
        Panel::Main => PanelView {
            kind: PanelKind::Photo,
            caption: content.main_text().to_string(),
            keyboard: keyboards::main_menu(),
        },
        Panel::Stats => PanelView {
            kind: PanelKind::Text,
            caption: content.stats_text().to_string(),
            keyboard: keyboards::back_to_menu(),
        },
        Panel::How => PanelView {
            kind: PanelKind::Text,
            caption: content.how_text().to_string(),
            keyboard: keyboards::back_to_menu(),
        },
        Panel::Bookmakers => PanelView {
            kind: PanelKind::Photo,
            caption: content.bookmakers_text().to_string(),
            keyboard: keyboards::bonus_offers(&content.bonus_offers()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_payloads() {
        assert_eq!(Panel::from_callback("main"), Some(Panel::Main));
        assert_eq!(Panel::from_callback("stats"), Some(Panel::Stats));
        assert_eq!(Panel::from_callback("how"), Some(Panel::How));
        assert_eq!(Panel::from_callback("bookmakers"), Some(Panel::Bookmakers));
        assert_eq!(Panel::from_callback("Main"), None);
        assert_eq!(Panel::from_callback(""), None);
    }

    #[test]
    fn test_stats_panel_without_key_uses_fallback() {
        let content = Content::from_json_str(r#"{"main_text": "Меню"}"#).unwrap();
        let view = render_panel(Panel::Stats, &content);
        assert_eq!(view.kind, PanelKind::Text);
        assert_eq!(view.caption, "Статистика временно недоступна");
        assert_eq!(view.keyboard.inline_keyboard.len(), 1);
    }

    #[test]
    fn test_main_panel_uses_configured_text() {
        let content = Content::from_json_str(r#"{"main_text": "Меню"}"#).unwrap();
        let view = render_panel(Panel::Main, &content);
        assert_eq!(view.kind, PanelKind::Photo);
        assert_eq!(view.caption, "Меню");
        assert_eq!(view.keyboard.inline_keyboard.len(), 4);
    }

    #[test]
    fn test_bookmakers_panel_lists_offers() {
        let content = Content::from_json_str(r#"{"bookmakers_text": "Бонусы"}"#).unwrap();
        let view = render_panel(Panel::Bookmakers, &content);
        assert_eq!(view.caption, "Бонусы");
        // три оффера и кнопка возврата
        assert_eq!(view.keyboard.inline_keyboard.len(), 4);
    }
}
