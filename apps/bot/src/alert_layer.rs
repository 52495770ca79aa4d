//! Tracing layer that forwards ERROR events to every administrator chat.
//!
//! At most one alert per `MIN_INTERVAL`; the same message is not repeated
//! within `DEDUP_WINDOW`. Sends are spawned onto the Tokio runtime so logging
//! never waits on Telegram.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use teloxide::{prelude::*, types::ChatId};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

const MIN_INTERVAL: Duration = Duration::from_secs(10);
const DEDUP_WINDOW: Duration = Duration::from_secs(60);

pub struct AdminAlertLayer {
    bot: Bot,
    admin_ids: Vec<i64>,
    throttle: Mutex<Throttle>,
}

impl AdminAlertLayer {
    pub fn new(bot: Bot, admin_ids: Vec<i64>) -> Self {
        Self {
            bot,
            admin_ids,
            throttle: Mutex::new(Throttle::default()),
        }
    }
}

impl<S: Subscriber> Layer<S> for AdminAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR || self.admin_ids.is_empty() {
            return;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);
        let summary = fields.summary();

        let admitted = self
            .throttle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .admit(hash_of(&summary), Instant::now());
        if !admitted {
            return;
        }

        // Events logged outside the runtime (e.g. during shutdown) are dropped.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let text = format!(
            "🚨 Ошибка бота\n━━━━━━━━━━━━━━━\n{}\n━━━━━━━━━━━━━━━\n📍 {}\n🕐 {}",
            summary,
            event.metadata().target(),
            chrono::Local::now().format("%d.%m.%Y %H:%M:%S"),
        );
        let bot = self.bot.clone();
        let admin_ids = self.admin_ids.clone();

        runtime.spawn(async move {
            for id in admin_ids {
                let _ = bot.send_message(ChatId(id), text.as_str()).await;
            }
        });
    }
}

fn hash_of(text: &str) -> u64 {
    let mut h = DefaultHasher::new();
    text.hash(&mut h);
    h.finish()
}

// ── Throttle ──

/// Rate limit plus duplicate suppression, driven by the caller's clock.
#[derive(Debug, Default)]
struct Throttle {
    last_sent: Option<Instant>,
    recent: Vec<(u64, Instant)>,
}

impl Throttle {
    fn admit(&mut self, hash: u64, now: Instant) -> bool {
        self.recent
            .retain(|(_, at)| now.saturating_duration_since(*at) < DEDUP_WINDOW);

        let too_soon = self
            .last_sent
            .is_some_and(|last| now.saturating_duration_since(last) < MIN_INTERVAL);
        let duplicate = self.recent.iter().any(|(h, _)| *h == hash);
        if too_soon || duplicate {
            return false;
        }

        self.last_sent = Some(now);
        self.recent.push((hash, now));
        true
    }
}

// ── Field collection ──

#[derive(Debug, Default)]
struct EventFields {
    message: String,
    extra: Vec<(&'static str, String)>,
}

impl EventFields {
    /// `"message (k=v, ...)"`, or just the fields when there is no message.
    fn summary(&self) -> String {
        let extra = self
            .extra
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        match (self.message.is_empty(), extra.is_empty()) {
            (_, true) => self.message.clone(),
            (true, false) => extra,
            (false, false) => format!("{} ({})", self.message, extra),
        }
    }

    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.extra.push((field.name(), value));
        }
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }
}
