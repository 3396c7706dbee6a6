//! Тексты панелей из внешнего JSON-файла (`connect.json`).
//!
//! Файл перечитывается на каждый запрос, поэтому правки применяются без
//! перезапуска бота.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub const KEY_MAIN_TEXT: &str = "main_text";
pub const KEY_STATS_TEXT: &str = "stats_text";
pub const KEY_HOW_TEXT: &str = "how_text";
pub const KEY_BOOKMAKERS_TEXT: &str = "bookmakers_text";

pub const DEFAULT_MAIN_TEXT: &str = "Добро пожаловать! 🚀";
pub const DEFAULT_STATS_TEXT: &str = "Статистика временно недоступна";
pub const DEFAULT_HOW_TEXT: &str = "Информация недоступна";
pub const DEFAULT_BOOKMAKERS_TEXT: &str = "Выбирай бонус";
pub const DEFAULT_BONUS_URL: &str = "https://google.com";

pub const BONUS_OFFER_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Не удалось прочитать {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Некорректный JSON в {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusOffer {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct Content {
    values: HashMap<String, String>,
}

impl Content {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let values = serde_json::from_str(raw)?;
        Ok(Self { values })
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(default)
    }

    pub fn main_text(&self) -> &str {
        self.get_or(KEY_MAIN_TEXT, DEFAULT_MAIN_TEXT)
    }

    pub fn stats_text(&self) -> &str {
        self.get_or(KEY_STATS_TEXT, DEFAULT_STATS_TEXT)
    }

    pub fn how_text(&self) -> &str {
        self.get_or(KEY_HOW_TEXT, DEFAULT_HOW_TEXT)
    }

    pub fn bookmakers_text(&self) -> &str {
        self.get_or(KEY_BOOKMAKERS_TEXT, DEFAULT_BOOKMAKERS_TEXT)
    }

    pub fn bonus_offers(&self) -> Vec<BonusOffer> {
        (1..=BONUS_OFFER_COUNT)
            .map(|index| {
                let default_text = format!("Бонус №{}", index);
                BonusOffer {
                    text: self
                        .get_or(&format!("bonus_btn{}_text", index), &default_text)
                        .to_string(),
                    url: self
                        .get_or(&format!("bonus_btn{}_url", index), DEFAULT_BONUS_URL)
                        .to_string(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Content, ContentError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ContentError::Read {
                path: self.path.clone(),
                source,
            })?;
        Content::from_json_str(&raw).map_err(|source| ContentError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}
