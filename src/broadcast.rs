//! Диалог подготовки рассылки: состояния и переходы между ними.
//!
//! Переходы вычисляются чистой функцией [`step`], а обработчик в
//! `bot::handlers` только применяет результат к диалогу и отправляет ответы.

use std::time::Duration;

/// Состояние диалога рассылки для одного чата.
///
/// Каждое активное состояние хранит unix-время начала диалога.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BroadcastState {
    #[default]
    Idle,
    AskPhoto {
        started_at: i64,
    },
    WaitPhoto {
        started_at: i64,
    },
    WaitText {
        started_at: i64,
        photo: String,
    },
    FinalText {
        started_at: i64,
    },
}

impl BroadcastState {
    pub fn begin(now: i64) -> Self {
        BroadcastState::AskPhoto { started_at: now }
    }

    pub fn started_at(&self) -> Option<i64> {
        match self {
            BroadcastState::Idle => None,
            BroadcastState::AskPhoto { started_at }
            | BroadcastState::WaitPhoto { started_at }
            | BroadcastState::WaitText { started_at, .. }
            | BroadcastState::FinalText { started_at } => Some(*started_at),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, BroadcastState::Idle)
    }

    pub fn is_expired(&self, now: i64, timeout: Option<Duration>) -> bool {
        match (self.started_at(), timeout) {
            (Some(started_at), Some(timeout)) => {
                let limit = i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX);
                now.saturating_sub(started_at) > limit
            }
            _ => false,
        }
    }
}

/// Входящее сообщение, сведённое к тому, что важно для диалога.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    /// file_id самого большого размера фото
    Photo(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPayload {
    pub photo: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Нет активного диалога, сообщение не наше
    Ignore,
    AskForPhoto,
    AskForText,
    AskForCaption,
    /// Ввод не подошёл, состояние не меняется
    Reprompt,
    Expired,
    Deliver(BroadcastPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: BroadcastState,
    pub action: Action,
}

impl Step {
    fn to(next: BroadcastState, action: Action) -> Self {
        Self { next, action }
    }
}

pub fn is_yes(text: &str) -> bool {
    text.trim().to_lowercase() == "да"
}

pub fn is_no(text: &str) -> bool {
    text.trim().to_lowercase() == "нет"
}

pub fn step(state: BroadcastState, input: Input, now: i64, timeout: Option<Duration>) -> Step {
    if state.is_expired(now, timeout) {
        return Step::to(BroadcastState::Idle, Action::Expired);
    }

    match (state, input) {
        (BroadcastState::Idle, _) => Step::to(BroadcastState::Idle, Action::Ignore),

        (BroadcastState::AskPhoto { started_at }, Input::Text(text)) if is_yes(&text) => Step::to(
            BroadcastState::WaitPhoto { started_at },
            Action::AskForPhoto,
        ),
        (BroadcastState::AskPhoto { started_at }, Input::Text(text)) if is_no(&text) => Step::to(
            BroadcastState::FinalText { started_at },
            Action::AskForText,
        ),

        (BroadcastState::WaitPhoto { started_at }, Input::Photo(photo)) => Step::to(
            BroadcastState::WaitText { started_at, photo },
            Action::AskForCaption,
        ),

        (BroadcastState::WaitText { photo, .. }, Input::Text(text)) => Step::to(
            BroadcastState::Idle,
            Action::Deliver(BroadcastPayload {
                photo: Some(photo),
                text,
            }),
        ),

        (BroadcastState::FinalText { .. }, Input::Text(text)) => Step::to(
            BroadcastState::Idle,
            Action::Deliver(BroadcastPayload { photo: None, text }),
        ),

        (state, _) => Step::to(state, Action::Reprompt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn text(value: &str) -> Input {
        Input::Text(value.to_string())
    }

    #[test]
    fn test_yes_variants_go_to_wait_photo() {
        for answer in ["да", "Да", "ДА", " дА "] {
            let result = step(BroadcastState::begin(NOW), text(answer), NOW, None);
            assert_eq!(result.next, BroadcastState::WaitPhoto { started_at: NOW });
            assert_eq!(result.action, Action::AskForPhoto);
        }
    }

    #[test]
    fn test_no_variants_go_to_final_text() {
        for answer in ["нет", "Нет", "НЕТ"] {
            let result = step(BroadcastState::begin(NOW), text(answer), NOW, None);
            assert_eq!(result.next, BroadcastState::FinalText { started_at: NOW });
            assert_eq!(result.action, Action::AskForText);
        }
    }

    #[test]
    fn test_other_answers_keep_ask_photo() {
        for input in [text("может"), text("yes"), Input::Photo("p".into()), Input::Other] {
            let result = step(BroadcastState::begin(NOW), input, NOW, None);
            assert_eq!(result.next, BroadcastState::begin(NOW));
            assert_eq!(result.action, Action::Reprompt);
        }
    }

    #[test]
    fn test_wait_photo_needs_photo() {
        let state = BroadcastState::WaitPhoto { started_at: NOW };
        let stalled = step(state.clone(), text("где фото"), NOW, None);
        assert_eq!(stalled.next, state);
        assert_eq!(stalled.action, Action::Reprompt);

        let moved = step(state, Input::Photo("file-big".into()), NOW, None);
        assert_eq!(
            moved.next,
            BroadcastState::WaitText {
                started_at: NOW,
                photo: "file-big".into(),
            }
        );
        assert_eq!(moved.action, Action::AskForCaption);
    }

    #[test]
    fn test_caption_delivers_photo_and_resets() {
        let state = BroadcastState::WaitText {
            started_at: NOW,
            photo: "file-big".into(),
        };
        let result = step(state, text("Подпись"), NOW, None);
        assert!(result.next.is_idle());
        assert_eq!(
            result.action,
            Action::Deliver(BroadcastPayload {
                photo: Some("file-big".into()),
                text: "Подпись".into(),
            })
        );
    }

    #[test]
    fn test_final_text_delivers_text_only() {
        let result = step(BroadcastState::FinalText { started_at: NOW }, text("Hello"), NOW, None);
        assert!(result.next.is_idle());
        assert_eq!(
            result.action,
            Action::Deliver(BroadcastPayload {
                photo: None,
                text: "Hello".into(),
            })
        );
    }

    #[test]
    fn test_idle_ignores_everything() {
        for input in [text("да"), text("Hello"), Input::Photo("p".into())] {
            let result = step(BroadcastState::Idle, input, NOW, None);
            assert!(result.next.is_idle());
            assert_eq!(result.action, Action::Ignore);
        }
    }

    #[test]
    fn test_timeout_expires_stale_flow() {
        let timeout = Some(Duration::from_secs(60));
        let state = BroadcastState::FinalText { started_at: NOW };

        let fresh = step(state.clone(), text("Hello"), NOW + 60, timeout);
        assert!(matches!(fresh.action, Action::Deliver(_)));

        let stale = step(state, text("Hello"), NOW + 61, timeout);
        assert!(stale.next.is_idle());
        assert_eq!(stale.action, Action::Expired);
    }

    #[test]
    fn test_no_timeout_never_expires() {
        let state = BroadcastState::begin(NOW);
        assert!(!state.is_expired(NOW + 365 * 24 * 3600, None));
        assert!(!BroadcastState::Idle.is_expired(NOW, Some(Duration::from_secs(1))));
    }
}
