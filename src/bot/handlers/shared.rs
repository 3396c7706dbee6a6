use super::menu::{PanelKind, PanelView};
use super::state::BotState;
use anyhow::anyhow;
use std::future::Future;
use std::path::PathBuf;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, MessageId, ParseMode};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub fn callback_message_target(q: &CallbackQuery) -> Option<(ChatId, MessageId)> {
    q.message.as_ref().map(|msg| (msg.chat().id, msg.id()))
}

/// Куда рисуются панели: правка на месте, новое сообщение, удаление.
pub trait PanelSurface {
    fn edit_panel(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        view: &PanelView,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn send_panel(
        &self,
        chat_id: ChatId,
        view: &PanelView,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;
}

/// Панели через Bot API: фото-панели с логотипом, текстовые — сообщением.
pub struct TelegramPanels {
    bot: Bot,
    logo_path: PathBuf,
    parse_mode: Option<ParseMode>,
}

impl TelegramPanels {
    pub fn new(bot: &Bot, state: &BotState) -> Self {
        Self {
            bot: bot.clone(),
            logo_path: state.config.logo_path.clone(),
            parse_mode: state.parse_mode(),
        }
    }

    fn logo(&self) -> InputFile {
        InputFile::file(self.logo_path.clone())
    }
}

impl PanelSurface for TelegramPanels {
    async fn edit_panel(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        view: &PanelView,
    ) -> Result<(), anyhow::Error> {
        match view.kind {
            PanelKind::Photo => {
                let mut media = InputMediaPhoto::new(self.logo()).caption(view.caption.clone());
                if let Some(parse_mode) = self.parse_mode {
                    media = media.parse_mode(parse_mode);
                }
                self.bot
                    .edit_message_media(chat_id, message_id, InputMedia::Photo(media))
                    .reply_markup(view.keyboard.clone())
                    .await
                    .map_err(|e| anyhow!("Не удалось изменить фото-панель: {}", e))?;
            }
            PanelKind::Text => {
                let mut request = self
                    .bot
                    .edit_message_text(chat_id, message_id, view.caption.clone())
                    .reply_markup(view.keyboard.clone());
                if let Some(parse_mode) = self.parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request
                    .await
                    .map_err(|e| anyhow!("Не удалось изменить текстовую панель: {}", e))?;
            }
        }
        Ok(())
    }

    async fn send_panel(&self, chat_id: ChatId, view: &PanelView) -> Result<(), anyhow::Error> {
        match view.kind {
            PanelKind::Photo => {
                let mut request = self
                    .bot
                    .send_photo(chat_id, self.logo())
                    .caption(view.caption.clone())
                    .reply_markup(view.keyboard.clone());
                if let Some(parse_mode) = self.parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request
                    .await
                    .map_err(|e| anyhow!("Не удалось отправить фото-панель: {}", e))?;
            }
            PanelKind::Text => {
                let mut request = self
                    .bot
                    .send_message(chat_id, view.caption.clone())
                    .reply_markup(view.keyboard.clone());
                if let Some(parse_mode) = self.parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request
                    .await
                    .map_err(|e| anyhow!("Не удалось отправить текстовую панель: {}", e))?;
            }
        }
        Ok(())
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), anyhow::Error> {
        self.bot
            .delete_message(chat_id, message_id)
            .await
            .map_err(|e| anyhow!("Не удалось удалить сообщение: {}", e))?;
        Ok(())
    }
}

/// Перерисовывает панель на месте. Если Telegram отказал в правке, сначала
/// присылает новую панель и только потом удаляет старую; при неудачной
/// отправке старая панель остаётся в чате.
pub async fn replace_panel<S: PanelSurface>(
    surface: &S,
    chat_id: ChatId,
    message_id: MessageId,
    view: &PanelView,
) -> Result<(), anyhow::Error> {
    let Err(error) = surface.edit_panel(chat_id, message_id, view).await else {
        return Ok(());
    };

    tracing::debug!(
        chat_id = chat_id.0,
        message_id = message_id.0,
        error = %error,
        "Panel edit rejected, sending a fresh one"
    );
    surface.send_panel(chat_id, view).await?;

    if let Err(delete_error) = surface.delete_message(chat_id, message_id).await {
        tracing::debug!(
            chat_id = chat_id.0,
            message_id = message_id.0,
            error = %delete_error,
            "Old panel already gone"
        );
    }
    Ok(())
}

/// Служебный ответ администратору с HTML-разметкой.
pub async fn send_html(bot: &Bot, chat_id: ChatId, text: &str) -> HandlerResult {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
