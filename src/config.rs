//! Конфигурация бота: TOML-файл, `.env` и переменные окружения.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use teloxide::types::ParseMode;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "panel-bot.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN не найден ни в окружении, ни в конфиге")]
    MissingToken,
    #[error("Конфиг {} не найден", .path.display())]
    NotFound { path: PathBuf },
    #[error("Не удалось прочитать конфиг {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Некорректный конфиг {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Некорректный id администратора: {0:?}")]
    InvalidAdminId(String),
}

/// Режим разметки для подписей панелей и рассылок.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelFormat {
    #[default]
    Markdown,
    MarkdownV2,
    Html,
    Plain,
}

impl PanelFormat {
    #[allow(deprecated)]
    pub fn parse_mode(self) -> Option<ParseMode> {
        match self {
            PanelFormat::Markdown => Some(ParseMode::Markdown),
            PanelFormat::MarkdownV2 => Some(ParseMode::MarkdownV2),
            PanelFormat::Html => Some(ParseMode::Html),
            PanelFormat::Plain => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot_token: Option<String>,
    pub admin_ids: Vec<i64>,
    pub users_path: PathBuf,
    pub content_path: PathBuf,
    pub logo_path: PathBuf,
    pub parse_mode: PanelFormat,
    pub broadcast_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_ids: Vec::new(),
            users_path: PathBuf::from("users.json"),
            content_path: PathBuf::from("connect.json"),
            logo_path: PathBuf::from("logo.png"),
            parse_mode: PanelFormat::default(),
            broadcast_timeout_secs: None,
        }
    }
}

impl Config {
    /// Читает конфиг и применяет переопределения из окружения.
    ///
    /// Явно указанный путь обязан существовать, путь по умолчанию может
    /// отсутствовать.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    tracing::info!(
                        path = DEFAULT_CONFIG_PATH,
                        "Config file not found, using defaults"
                    );
                    Self::default()
                }
            }
        };

        config.apply_env(
            std::env::var("BOT_TOKEN").ok(),
            std::env::var("ADMIN_IDS").ok(),
        )?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn apply_env(
        &mut self,
        bot_token: Option<String>,
        admin_ids: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(token) = bot_token
            && !token.trim().is_empty()
        {
            self.bot_token = Some(token.trim().to_string());
        }
        if let Some(raw) = admin_ids {
            self.admin_ids = parse_admin_ids(&raw)?;
        }
        Ok(())
    }

    pub fn bot_token(&self) -> Result<String, ConfigError> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::MissingToken)
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn broadcast_timeout(&self) -> Option<Duration> {
        self.broadcast_timeout_secs.map(Duration::from_secs)
    }
}

/// Разбирает список id через запятую; пустая строка — нет администраторов.
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidAdminId(part.to_string()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
