use super::format::{ACCESS_DENIED, ASK_PHOTO_PROMPT, CANCELLED, NOTHING_TO_CANCEL};
use super::menu::{Panel, render_panel};
use super::shared::{HandlerResult, PanelSurface, TelegramPanels, send_html};
use super::state::{BotState, BroadcastDialogue, is_admin_message, sender_user_id, unix_now};
use crate::broadcast::BroadcastState;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum BotCommand {
    #[command(description = "Главное меню")]
    Start,
    #[command(description = "Рассылка всем пользователям (админ)")]
    Broadcast,
    #[command(description = "Отменить рассылку (админ)")]
    Cancel,
}

pub fn handler() -> teloxide::dispatching::UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    teloxide::filter_command::<BotCommand, _>()
        .branch(dptree::case![BotCommand::Start].endpoint(start_cmd))
        .branch(dptree::case![BotCommand::Broadcast].endpoint(cmd_broadcast))
        .branch(dptree::case![BotCommand::Cancel].endpoint(cmd_cancel))
}

async fn start_cmd(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    if let Some(user_id) = sender_user_id(&msg) {
        tracing::info!(user_id = user_id, "Received /start command");
        match state.registry.register(user_id).await {
            Ok(outcome) if outcome.added || outcome.backfilled_admins > 0 => {
                tracing::info!(
                    user_id = user_id,
                    added = outcome.added,
                    backfilled_admins = outcome.backfilled_admins,
                    "Registry extended"
                );
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(
                    user_id = user_id,
                    registry = %state.registry.path().display(),
                    error = %error,
                    "Failed to save user to registry"
                );
            }
        }
    }

    let content = state.content.load().await?;
    let view = render_panel(Panel::Main, &content);
    TelegramPanels::new(&bot, &state)
        .send_panel(msg.chat.id, &view)
        .await?;
    Ok(())
}

/// Ответ на /broadcast и следующее состояние диалога: не-админ получает
/// отказ, а его состояние не меняется.
pub fn begin_broadcast(
    is_admin: bool,
    current: BroadcastState,
    now: i64,
) -> (BroadcastState, &'static str) {
    if is_admin {
        (BroadcastState::begin(now), ASK_PHOTO_PROMPT)
    } else {
        (current, ACCESS_DENIED)
    }
}

async fn cmd_broadcast(
    bot: Bot,
    msg: Message,
    state: BotState,
    dialogue: BroadcastDialogue,
) -> HandlerResult {
    let is_admin = is_admin_message(&msg, &state);
    if is_admin {
        tracing::info!(admin_id = ?sender_user_id(&msg), "Admin command /broadcast");
    } else {
        tracing::warn!(
            user_id = ?sender_user_id(&msg),
            "Broadcast attempt without admin rights"
        );
    }

    let current = dialogue.get_or_default().await?;
    let (next, reply) = begin_broadcast(is_admin, current.clone(), unix_now());
    send_html(&bot, msg.chat.id, reply).await?;
    if next != current {
        dialogue.update(next).await?;
    }
    Ok(())
}

async fn cmd_cancel(
    bot: Bot,
    msg: Message,
    state: BotState,
    dialogue: BroadcastDialogue,
) -> HandlerResult {
    if !is_admin_message(&msg, &state) {
        return Ok(());
    }

    let current = dialogue.get_or_default().await?;
    if current.is_idle() {
        bot.send_message(msg.chat.id, NOTHING_TO_CANCEL).await?;
        return Ok(());
    }

    dialogue.exit().await?;
    tracing::info!(admin_id = ?sender_user_id(&msg), "Broadcast cancelled");
    bot.send_message(msg.chat.id, CANCELLED).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_non_admin_is_denied_and_state_kept() {
        let states = [
            BroadcastState::Idle,
            BroadcastState::begin(NOW - 10),
            BroadcastState::FinalText { started_at: NOW - 5 },
        ];
        for current in states {
            let (next, reply) = begin_broadcast(false, current.clone(), NOW);
            assert_eq!(next, current);
            assert_eq!(reply, ACCESS_DENIED);
        }
    }

    #[test]
    fn test_admin_enters_ask_photo() {
        let (next, reply) = begin_broadcast(true, BroadcastState::Idle, NOW);
        assert_eq!(next, BroadcastState::AskPhoto { started_at: NOW });
        assert_eq!(reply, ASK_PHOTO_PROMPT);
    }

    #[test]
    fn test_admin_restarts_flow_midway() {
        let current = BroadcastState::WaitText {
            started_at: NOW - 100,
            photo: "file".into(),
        };
        let (next, _) = begin_broadcast(true, current, NOW);
        assert_eq!(next, BroadcastState::begin(NOW));
    }
}
