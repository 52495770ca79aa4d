//! Outgoing side of the bot: the messenger seam, its Telegram implementation,
//! and the best-effort relay used by every handler.

use std::future::Future;

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup},
};

use crate::error::SendError;
use crate::BotState;

/// Telegram rejects inline keyboards with more buttons than this.
pub const MAX_KEYBOARD_CHOICES: usize = 100;

/// One inline button: what the user sees and what comes back on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub payload: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// What the core needs from the chat transport.
pub trait Messenger: Send + Sync {
    fn send_text(
        &self,
        chat_id: i64,
        text: &str,
    ) -> impl Future<Output = Result<(), SendError>> + Send;

    /// Text with one button per row, in order.
    fn send_choice(
        &self,
        chat_id: i64,
        text: &str,
        choices: &[Choice],
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}

// ── Telegram ──

pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(drop)
            .map_err(|e| SendError {
                chat_id,
                detail: e.to_string(),
            })
    }

    async fn send_choice(
        &self,
        chat_id: i64,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), SendError> {
        let rows: Vec<Vec<InlineKeyboardButton>> = choices
            .iter()
            .map(|c| vec![InlineKeyboardButton::callback(c.label.clone(), c.payload.clone())])
            .collect();

        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(InlineKeyboardMarkup::new(rows))
            .await
            .map(drop)
            .map_err(|e| SendError {
                chat_id,
                detail: e.to_string(),
            })
    }
}

// ── Relay ──

// Delivery failures stop here: logged at warn, never returned to the handler.
// Warn (not error) keeps them out of the admin alert layer.
impl<M: Messenger> BotState<M> {
    /// Answer in the chat the event came from.
    pub async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text).await {
            tracing::warn!("reply dropped: {}", e);
        }
    }

    /// Sends the menu, split into several messages when it has more buttons
    /// than one keyboard may carry. Later parts are numbered `(n/total)`.
    pub async fn offer(&self, chat_id: i64, text: &str, choices: &[Choice]) {
        if choices.len() <= MAX_KEYBOARD_CHOICES {
            self.offer_one(chat_id, text, choices).await;
            return;
        }

        let pages = choices.len().div_ceil(MAX_KEYBOARD_CHOICES);
        for (i, chunk) in choices.chunks(MAX_KEYBOARD_CHOICES).enumerate() {
            let text = format!("{} ({}/{})", text, i + 1, pages);
            self.offer_one(chat_id, &text, chunk).await;
        }
    }

    async fn offer_one(&self, chat_id: i64, text: &str, choices: &[Choice]) {
        if let Err(e) = self.messenger.send_choice(chat_id, text, choices).await {
            tracing::warn!("menu dropped: {}", e);
        }
    }

    /// Returns whether the user was reached.
    pub async fn notify_user(&self, user_id: i64, text: &str) -> bool {
        match self.messenger.send_text(user_id, text).await {
            Ok(()) => true,
            Err(e) => {
                // user may have blocked the bot
                tracing::warn!("user notification dropped: {}", e);
                false
            }
        }
    }

    /// Sends `text` to every admin independently. Returns how many were reached.
    pub async fn notify_admins(&self, text: &str) -> usize {
        let mut delivered = 0;
        for &admin_id in self.admins.ids() {
            match self.messenger.send_text(admin_id, text).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("admin notification dropped: {}", e),
            }
        }
        delivered
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::auth::AdminGate;
    use crate::reviews::PendingReviews;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Sent {
        pub chat_id: i64,
        pub text: String,
        pub choices: Vec<Choice>,
    }

    /// Captures outgoing messages. Chats listed as unreachable fail every send.
    #[derive(Debug, Default)]
    pub struct RecordingMessenger {
        sent: Mutex<Vec<Sent>>,
        unreachable: HashSet<i64>,
    }

    impl RecordingMessenger {
        pub fn with_unreachable(ids: impl IntoIterator<Item = i64>) -> Self {
            Self {
                sent: Mutex::default(),
                unreachable: ids.into_iter().collect(),
            }
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self, chat_id: i64) -> Vec<Sent> {
            self.sent()
                .into_iter()
                .filter(|s| s.chat_id == chat_id)
                .collect()
        }

        pub fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }

        fn record(&self, chat_id: i64, text: &str, choices: &[Choice]) -> Result<(), SendError> {
            if self.unreachable.contains(&chat_id) {
                return Err(SendError {
                    chat_id,
                    detail: "bot was blocked by the user".into(),
                });
            }
            self.sent.lock().unwrap().push(Sent {
                chat_id,
                text: text.to_string(),
                choices: choices.to_vec(),
            });
            Ok(())
        }
    }

    impl Messenger for RecordingMessenger {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
            self.record(chat_id, text, &[])
        }

        async fn send_choice(
            &self,
            chat_id: i64,
            text: &str,
            choices: &[Choice],
        ) -> Result<(), SendError> {
            self.record(chat_id, text, choices)
        }
    }

    pub async fn test_state(
        admins: &[i64],
        messenger: RecordingMessenger,
    ) -> BotState<RecordingMessenger> {
        BotState {
            store: crate::db::tests::memory_store().await,
            pending: PendingReviews::new(),
            admins: AdminGate::new(admins.iter().copied()),
            messenger,
            contact_text: "📞 Contact: @studio".into(),
            portfolio_url: Some("https://t.me/studio_works".into()),
        }
    }
}
