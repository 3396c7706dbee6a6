use super::menu::{Panel, render_panel};
use super::shared::{
    HandlerResult, PanelSurface, TelegramPanels, callback_message_target, replace_panel,
};
use super::state::BotState;
use teloxide::dptree;
use teloxide::prelude::*;

pub fn handler() -> teloxide::dispatching::UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_callback_query()
        .branch(dptree::filter_map(callback_panel).endpoint(callback_show_panel))
        .endpoint(callback_unknown)
}

fn callback_panel(q: CallbackQuery) -> Option<Panel> {
    q.data.as_deref().and_then(Panel::from_callback)
}

async fn callback_show_panel(
    bot: Bot,
    q: CallbackQuery,
    panel: Panel,
    state: BotState,
) -> HandlerResult {
    tracing::debug!(user_id = q.from.id.0, panel = ?panel, "Panel callback received");
    bot.answer_callback_query(q.id.clone()).await?;

    let content = state.content.load().await?;
    let view = render_panel(panel, &content);
    let panels = TelegramPanels::new(&bot, &state);

    match callback_message_target(&q) {
        Some((chat_id, message_id)) => {
            replace_panel(&panels, chat_id, message_id, &view).await?;
        }
        None => {
            panels.send_panel(ChatId(q.from.id.0 as i64), &view).await?;
        }
    }
    Ok(())
}

async fn callback_unknown(bot: Bot, q: CallbackQuery) -> HandlerResult {
    tracing::debug!(
        user_id = q.from.id.0,
        data = ?q.data,
        "Unknown callback payload"
    );
    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}
