//! Сообщения внутри диалога рассылки.

use super::format::{
    CAPTION_PROMPT, EXPIRED, FINAL_TEXT_PROMPT, WAIT_PHOTO_PROMPT, broadcast_reply, reprompt_text,
};
use super::shared::{HandlerResult, send_html};
use super::state::{BotState, BroadcastDialogue, is_admin_message, sender_user_id, unix_now};
use crate::broadcast::{Action, BroadcastPayload, BroadcastState, Input, Step, step};
use crate::fanout::{TelegramDelivery, fan_out};
use std::time::Duration;
use teloxide::prelude::*;

pub async fn handle_dialogue_message(
    bot: Bot,
    msg: Message,
    state: BotState,
    dialogue: BroadcastDialogue,
) -> HandlerResult {
    let current = dialogue.get_or_default().await?;
    let Some(Step { next, action }) = dialogue_step(
        current,
        is_admin_message(&msg, &state),
        message_input(&msg),
        unix_now(),
        state.config.broadcast_timeout(),
    ) else {
        return Ok(());
    };
    if next.is_idle() {
        dialogue.exit().await?;
    } else {
        dialogue.update(next.clone()).await?;
    }

    match action {
        Action::Ignore => {}
        Action::AskForPhoto => send_html(&bot, msg.chat.id, WAIT_PHOTO_PROMPT).await?,
        Action::AskForText => send_html(&bot, msg.chat.id, FINAL_TEXT_PROMPT).await?,
        Action::AskForCaption => send_html(&bot, msg.chat.id, CAPTION_PROMPT).await?,
        Action::Reprompt => send_html(&bot, msg.chat.id, reprompt_text(&next)).await?,
        Action::Expired => {
            tracing::info!(admin_id = ?sender_user_id(&msg), "Broadcast dialogue expired");
            send_html(&bot, msg.chat.id, EXPIRED).await?;
        }
        Action::Deliver(payload) => {
            run_broadcast(&bot, msg.chat.id, &state, payload).await?;
        }
    }
    Ok(())
}

/// Шаг диалога для входящего сообщения. `None` — сообщение не относится к
/// рассылке: диалога нет или пишет не администратор.
pub fn dialogue_step(
    current: BroadcastState,
    from_admin: bool,
    input: Input,
    now: i64,
    timeout: Option<Duration>,
) -> Option<Step> {
    if current.is_idle() || !from_admin {
        return None;
    }
    Some(step(current, input, now, timeout))
}

fn message_input(msg: &Message) -> Input {
    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        return Input::Photo(largest.file.id.0.clone());
    }
    match msg.text() {
        Some(text) => Input::Text(text.to_string()),
        None => Input::Other,
    }
}

async fn run_broadcast(
    bot: &Bot,
    admin_chat: ChatId,
    state: &BotState,
    payload: BroadcastPayload,
) -> HandlerResult {
    let outcome = match state.registry.list_all().await {
        Ok(recipients) => {
            tracing::info!(
                recipients = recipients.len(),
                with_photo = payload.photo.is_some(),
                "Starting broadcast"
            );
            let delivery = TelegramDelivery::new(bot.clone(), state.parse_mode());
            let report = fan_out(&delivery, &recipients, &payload).await;
            if report.failed() > 0 {
                tracing::info!(failed_ids = ?report.failed_ids(), "Broadcast recipients not reached");
            }
            Ok(report)
        }
        Err(error) => {
            tracing::error!(error = %error, "Cannot read registry, broadcast aborted");
            Err(error)
        }
    };

    bot.send_message(admin_chat, broadcast_reply(&outcome)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn active_states() -> Vec<BroadcastState> {
        vec![
            BroadcastState::begin(NOW),
            BroadcastState::WaitPhoto { started_at: NOW },
            BroadcastState::WaitText {
                started_at: NOW,
                photo: "file".into(),
            },
            BroadcastState::FinalText { started_at: NOW },
        ]
    }

    #[test]
    fn test_non_admin_never_advances_flow() {
        for current in active_states() {
            for input in [
                Input::Text("да".into()),
                Input::Text("Hello".into()),
                Input::Photo("file".into()),
            ] {
                assert_eq!(dialogue_step(current.clone(), false, input, NOW, None), None);
            }
        }
    }

    #[test]
    fn test_idle_chat_is_skipped_even_for_admin() {
        assert_eq!(
            dialogue_step(BroadcastState::Idle, true, Input::Text("нет".into()), NOW, None),
            None
        );
    }

    #[test]
    fn test_admin_advances_flow() {
        let result = dialogue_step(
            BroadcastState::begin(NOW),
            true,
            Input::Text("нет".into()),
            NOW,
            None,
        )
        .unwrap();
        assert_eq!(result.next, BroadcastState::FinalText { started_at: NOW });
        assert_eq!(result.action, Action::AskForText);
    }
}
