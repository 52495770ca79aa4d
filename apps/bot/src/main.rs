mod alert_layer;
mod auth;
mod callback;
mod config;
mod db;
mod error;
mod handlers;
mod keyboards;
mod models;
mod notify;
mod reviews;

use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use auth::AdminGate;
use config::Config;
use db::Store;
use handlers::{Event, Sender};
use notify::TelegramMessenger;
use reviews::PendingReviews;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Записаться")]
    Start,
    #[command(description = "Оставить отзыв")]
    Review,
    #[command(description = "Пропустить комментарий к записи")]
    Skip,
    #[command(description = "Панель администратора")]
    Admin,
}

/// Process-wide context shared by every handler. Built once at startup.
pub struct BotState<M> {
    pub store: Store,
    pub pending: PendingReviews,
    pub admins: AdminGate,
    pub messenger: M,
    pub contact_text: String,
    pub portfolio_url: Option<String>,
}

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Read before tracing so the alert layer knows where to send.
    let config = Config::from_env()?;
    let bot = Bot::new(&config.bot_token);

    let env_filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(alert_layer::AdminAlertLayer::new(
            bot.clone(),
            config.admin_ids.clone(),
        ))
        .init();

    if config.admin_ids.is_empty() {
        tracing::warn!("ADMIN_IDS not set, admin panel and notifications are disabled");
    }

    let store = Store::connect(&config.database_url).await?;
    store.initialize().await?;

    if let Err(e) = bot.delete_webhook().drop_pending_updates(true).await {
        tracing::warn!("Webhook cleanup failed: {}", e);
    }
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Could not register command menu: {}", e);
    }

    let state = Arc::new(BotState {
        store,
        pending: PendingReviews::new(),
        admins: AdminGate::new(config.admin_ids.iter().copied()),
        messenger: TelegramMessenger::new(bot.clone()),
        contact_text: config.contact_text,
        portfolio_url: config.portfolio_url,
    });

    tracing::info!("📅 Booking bot starting...");

    let cmd_handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint({
            let state = state.clone();
            move |msg: Message, cmd: Command| {
                let state = state.clone();
                async move {
                    if let Some(sender) = sender_of_message(&msg) {
                        handlers::dispatch(state.as_ref(), &sender, Event::Command(cmd)).await;
                    }
                    HandlerResult::Ok(())
                }
            }
        });

    let callback_handler = Update::filter_callback_query().endpoint({
        let state = state.clone();
        move |bot: Bot, q: CallbackQuery| {
            let state = state.clone();
            async move {
                let sender = sender_of_callback(&q);
                let data = q.data.clone().unwrap_or_default();
                handlers::dispatch(state.as_ref(), &sender, Event::Button(data)).await;

                // stop the button spinner
                if let Err(e) = bot.answer_callback_query(&q.id).await {
                    tracing::warn!("answer_callback_query failed: {}", e);
                }
                HandlerResult::Ok(())
            }
        }
    });

    let text_handler = Update::filter_message().endpoint({
        let state = state.clone();
        move |msg: Message| {
            let state = state.clone();
            async move {
                if let (Some(sender), Some(text)) = (sender_of_message(&msg), msg.text()) {
                    handlers::dispatch(state.as_ref(), &sender, Event::Text(text.to_string()))
                        .await;
                }
                HandlerResult::Ok(())
            }
        }
    });

    let handler = dptree::entry()
        .branch(cmd_handler)
        .branch(callback_handler)
        .branch(text_handler);

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

// ── Update → Sender ──

fn sender_of_message(msg: &Message) -> Option<Sender> {
    let user = msg.from.as_ref()?;
    Some(Sender {
        user_id: user.id.0 as i64,
        name: user.first_name.clone(),
        chat_id: msg.chat.id.0,
    })
}

/// Answers go to the chat holding the button, or to the user directly when
/// that message is no longer accessible.
fn sender_of_callback(q: &CallbackQuery) -> Sender {
    let user_id = q.from.id.0 as i64;
    Sender {
        user_id,
        name: q.from.first_name.clone(),
        chat_id: q.message.as_ref().map(|m| m.chat().id.0).unwrap_or(user_id),
    }
}
