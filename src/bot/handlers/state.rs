use crate::broadcast::BroadcastState;
use crate::config::Config;
use crate::content::ContentStore;
use crate::registry::UserRegistry;
use std::sync::Arc;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{Message, ParseMode};

pub type BroadcastDialogue = Dialogue<BroadcastState, InMemStorage<BroadcastState>>;

#[derive(Clone)]
pub struct BotState {
    pub config: Arc<Config>,
    pub registry: Arc<UserRegistry>,
    pub content: Arc<ContentStore>,
}

impl BotState {
    pub fn new(config: Config) -> Self {
        let registry = UserRegistry::new(config.users_path.clone(), config.admin_ids.clone());
        let content = ContentStore::new(config.content_path.clone());
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            content: Arc::new(content),
        }
    }

    pub fn parse_mode(&self) -> Option<ParseMode> {
        self.config.parse_mode.parse_mode()
    }
}

pub fn sender_user_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().map(|user| user.id.0 as i64)
}

pub fn is_admin_message(msg: &Message, state: &BotState) -> bool {
    sender_user_id(msg).is_some_and(|user_id| state.config.is_admin(user_id))
}

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
