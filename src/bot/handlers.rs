//! Обработчики команд, кнопок и диалога рассылки.

#[path = "handlers/callbacks/mod.rs"]
mod callbacks;
#[path = "handlers/commands/mod.rs"]
mod commands;
#[path = "handlers/dialogue.rs"]
mod dialogue;
#[path = "handlers/format.rs"]
mod format;
#[path = "handlers/menu.rs"]
mod menu;
#[path = "handlers/shared.rs"]
mod shared;
#[path = "handlers/state.rs"]
mod state;

pub use state::BotState;

use crate::broadcast::BroadcastState;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::{DpHandlerDescription, HandlerExt};
use teloxide::dptree;
use teloxide::prelude::*;

pub fn schema() -> dptree::Handler<
    'static,
    Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>,
    DpHandlerDescription,
> {
    let message_handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<BroadcastState>, BroadcastState>()
        .branch(commands::handler())
        .endpoint(dialogue::handle_dialogue_message);

    dptree::entry()
        .branch(message_handler)
        .branch(callbacks::handler())
}
