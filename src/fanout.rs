//! Рассылка по реестру: по одному получателю за раз, без повторов.

use crate::broadcast::BroadcastPayload;
use std::future::Future;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, ParseMode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
}

/// Доставка одного сообщения рассылки одному получателю.
pub trait Delivery {
    fn deliver(
        &self,
        user_id: i64,
        payload: &BroadcastPayload,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOutcome {
    pub user_id: i64,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Default)]
pub struct BroadcastReport {
    pub outcomes: Vec<RecipientOutcome>,
}

impl BroadcastReport {
    pub fn sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == DeliveryStatus::Sent)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.sent()
    }

    pub fn failed_ids(&self) -> Vec<i64> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, DeliveryStatus::Failed(_)))
            .map(|outcome| outcome.user_id)
            .collect()
    }
}

pub async fn fan_out<D: Delivery>(
    delivery: &D,
    recipients: &[i64],
    payload: &BroadcastPayload,
) -> BroadcastReport {
    let mut report = BroadcastReport {
        outcomes: Vec::with_capacity(recipients.len()),
    };

    for &user_id in recipients {
        let status = match delivery.deliver(user_id, payload).await {
            Ok(()) => DeliveryStatus::Sent,
            Err(error) => {
                tracing::warn!(
                    user_id = user_id,
                    with_photo = payload.photo.is_some(),
                    error = %error,
                    "Broadcast delivery failed"
                );
                DeliveryStatus::Failed(error.to_string())
            }
        };
        report.outcomes.push(RecipientOutcome { user_id, status });
    }

    tracing::info!(
        recipients = recipients.len(),
        sent = report.sent(),
        failed = report.failed(),
        "Broadcast finished"
    );
    report
}

/// Доставка через Bot API с кнопкой возврата в меню.
pub struct TelegramDelivery {
    bot: Bot,
    parse_mode: Option<ParseMode>,
}

impl TelegramDelivery {
    pub fn new(bot: Bot, parse_mode: Option<ParseMode>) -> Self {
        Self { bot, parse_mode }
    }
}

impl Delivery for TelegramDelivery {
    async fn deliver(&self, user_id: i64, payload: &BroadcastPayload) -> Result<(), DeliveryError> {
        let chat_id = ChatId(user_id);
        let keyboard = crate::bot::keyboards::back_to_menu();

        match &payload.photo {
            Some(photo) => {
                let mut request = self
                    .bot
                    .send_photo(chat_id, InputFile::file_id(FileId(photo.clone())))
                    .caption(payload.text.clone())
                    .reply_markup(keyboard);
                if let Some(parse_mode) = self.parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request.await?;
            }
            None => {
                let mut request = self
                    .bot
                    .send_message(chat_id, payload.text.clone())
                    .reply_markup(keyboard);
                if let Some(parse_mode) = self.parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request.await?;
            }
        }
        Ok(())
    }
}
