//! Admin panel. Button actions are gated by the router; `/admin` checks here.

use crate::error::BotError;
use crate::handlers::{pack_messages, require_admin, Sender};
use crate::keyboards;
use crate::models::CommentState;
use crate::notify::Messenger;
use crate::BotState;

const ADMIN_REVIEWS_LIMIT: i64 = 50;

pub async fn panel<M: Messenger>(state: &BotState<M>, sender: &Sender) -> Result<(), BotError> {
    require_admin(state, sender)?;
    state
        .offer(sender.chat_id, "🔧 Панель администратора", &keyboards::admin_menu())
        .await;
    Ok(())
}

pub async fn view_bookings<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    let bookings = state.store.list_bookings().await?;
    if bookings.is_empty() {
        state.reply(sender.chat_id, "Записей пока нет.").await;
        return Ok(());
    }

    let entries: Vec<String> = bookings
        .iter()
        .map(|b| {
            let comment = match b.comment_state() {
                CommentState::Provided(text) => text,
                CommentState::Awaiting | CommentState::Skipped => "-",
            };
            format!(
                "ID: {}\n👤 {}\n📅 {}\nКомментарий: {}\n\n",
                b.id,
                b.name,
                b.slot_label(),
                comment
            )
        })
        .collect();

    for page in pack_messages("📋 Все записи:\n\n", &entries) {
        state.reply(sender.chat_id, &page).await;
    }
    Ok(())
}

pub async fn view_reviews<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    let reviews = state.store.list_reviews(ADMIN_REVIEWS_LIMIT).await?;
    if reviews.is_empty() {
        state.reply(sender.chat_id, "Отзывы отсутствуют.").await;
        return Ok(());
    }

    let entries: Vec<String> = reviews
        .iter()
        .map(|r| {
            format!(
                "ID:{} 👤 {} [{}]: {} ({})\n\n",
                r.id,
                r.name,
                r.user_id,
                r.text,
                r.created_label()
            )
        })
        .collect();

    for page in pack_messages("📝 Все отзывы:\n\n", &entries) {
        state.reply(sender.chat_id, &page).await;
    }
    Ok(())
}

// ── Cancel ──

pub async fn cancel_menu<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    let bookings = state.store.list_bookings().await?;
    if bookings.is_empty() {
        state.reply(sender.chat_id, "Нет записей для отмены.").await;
        return Ok(());
    }

    state
        .offer(
            sender.chat_id,
            "Выберите запись для отмены:",
            &keyboards::cancel_choices(&bookings),
        )
        .await;
    Ok(())
}

pub async fn cancel<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    booking_id: i64,
) -> Result<(), BotError> {
    let booking = state
        .store
        .get_booking(booking_id)
        .await?
        .ok_or(BotError::NotFound(booking_id))?;

    // Another admin may have cancelled it in between.
    if !state.store.delete_booking(booking_id).await? {
        return Err(BotError::NotFound(booking_id));
    }
    tracing::info!(
        booking_id,
        admin_id = sender.user_id,
        "Booking cancelled by admin"
    );

    state
        .reply(
            sender.chat_id,
            &format!("✅ Отменено: {} ({})", booking.name, booking.slot_label()),
        )
        .await;
    state
        .notify_user(
            booking.user_id,
            &format!(
                "⚠️ Ваша запись на {} была отменена администратором",
                booking.slot_label()
            ),
        )
        .await;
    Ok(())
}

// ── Reschedule ──

pub async fn edit_menu<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    let bookings = state.store.list_bookings().await?;
    if bookings.is_empty() {
        state.reply(sender.chat_id, "Нет записей для изменения.").await;
        return Ok(());
    }

    state
        .offer(
            sender.chat_id,
            "Выберите запись для изменения:",
            &keyboards::edit_choices(&bookings),
        )
        .await;
    Ok(())
}

pub async fn pick_new_date<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    booking_id: i64,
) -> Result<(), BotError> {
    let booking = state
        .store
        .get_booking(booking_id)
        .await?
        .ok_or(BotError::NotFound(booking_id))?;

    state
        .offer(
            sender.chat_id,
            &format!(
                "Выберите новую дату для {} ({}):",
                booking.name,
                booking.slot_label()
            ),
            &keyboards::new_date_choices(booking_id, keyboards::today()),
        )
        .await;
    Ok(())
}

/// Only the date moves; the slot time and comment are kept.
pub async fn reschedule<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    booking_id: i64,
    new_date: &str,
) -> Result<(), BotError> {
    let booking = state
        .store
        .get_booking(booking_id)
        .await?
        .ok_or(BotError::NotFound(booking_id))?;

    if !state.store.reschedule_booking(booking_id, new_date).await? {
        return Err(BotError::NotFound(booking_id));
    }
    tracing::info!(
        booking_id,
        admin_id = sender.user_id,
        "Booking moved from {} to {}",
        booking.date,
        new_date
    );

    state
        .reply(
            sender.chat_id,
            &format!("✅ Обновлено: {} → {} {}", booking.name, new_date, booking.time),
        )
        .await;
    state
        .notify_user(
            booking.user_id,
            &format!(
                "📅 Ваша запись перенесена на {} в {}",
                new_date, booking.time
            ),
        )
        .await;
    Ok(())
}
