use crate::error::BotError;
use crate::handlers::{pack_messages, Sender};
use crate::keyboards;
use crate::notify::Messenger;
use crate::BotState;

/// Reviews shown to regular users.
const PUBLIC_REVIEWS_LIMIT: i64 = 10;

// ── Booking ──

pub async fn start<M: Messenger>(state: &BotState<M>, sender: &Sender) -> Result<(), BotError> {
    let dates = keyboards::date_choices(keyboards::today());
    state
        .offer(sender.chat_id, "📅 Выберите дату для записи:", &dates)
        .await;
    state
        .offer(sender.chat_id, "Быстрые команды:", &keyboards::main_menu())
        .await;
    Ok(())
}

pub async fn choose_date<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    date: &str,
) -> Result<(), BotError> {
    state
        .offer(
            sender.chat_id,
            &format!("Вы выбрали дату: {date}\nВыберите время:"),
            &keyboards::time_choices(date),
        )
        .await;
    Ok(())
}

/// The booking starts without a comment; the user's next free text (or
/// `/skip`) fills it in.
pub async fn book<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    date: &str,
    time: &str,
) -> Result<(), BotError> {
    let id = state
        .store
        .create_booking(sender.user_id, &sender.name, date, time)
        .await?;
    tracing::info!(booking_id = id, user_id = sender.user_id, "📌 Booking created for {} {}", date, time);

    state
        .reply(
            sender.chat_id,
            &format!(
                "✅ Вы записаны на {date} в {time}.\n\
                 Напишите комментарий к записи или отправьте /skip, чтобы пропустить."
            ),
        )
        .await;

    state
        .notify_admins(&format!(
            "📌 Новая запись:\n👤 {}\n📅 {} {}",
            sender.name, date, time
        ))
        .await;
    Ok(())
}

pub async fn capture_comment<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    text: &str,
) -> Result<(), BotError> {
    let Some(booking_id) = state.store.find_latest_open_booking(sender.user_id).await? else {
        state
            .reply(
                sender.chat_id,
                "Я не нашёл запись для добавления комментария. Отправьте /start, чтобы записаться.",
            )
            .await;
        return Ok(());
    };

    let comment = text.trim();
    state.store.set_booking_comment(booking_id, comment).await?;

    state
        .reply(sender.chat_id, "✅ Комментарий сохранён. Ваша запись подтверждена.")
        .await;
    state
        .notify_admins(&format!(
            "💬 Комментарий к записи от {}: {}",
            sender.name, comment
        ))
        .await;
    Ok(())
}

/// Closes the newest open booking with an empty comment.
pub async fn skip_comment<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    let Some(booking_id) = state.store.find_latest_open_booking(sender.user_id).await? else {
        state.reply(sender.chat_id, "Нет ожидающих комментариев.").await;
        return Ok(());
    };

    state.store.set_booking_comment(booking_id, "").await?;
    state
        .reply(sender.chat_id, "Комментарий пропущен. Ваша запись подтверждена.")
        .await;
    Ok(())
}

// ── Reviews ──

pub async fn request_review<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    state.pending.mark_pending(sender.user_id);
    state
        .reply(sender.chat_id, "Напишите, пожалуйста, ваш отзыв в сообщении.")
        .await;
    Ok(())
}

/// The pending marker is already consumed by the router, whatever happens here.
pub async fn capture_review<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    text: &str,
) -> Result<(), BotError> {
    let text = text.trim();
    if text.is_empty() {
        state
            .reply(
                sender.chat_id,
                "Отзыв не может быть пустым. Отправьте /review, чтобы попробовать снова.",
            )
            .await;
        return Ok(());
    }

    let id = state
        .store
        .create_review(sender.user_id, &sender.name, text)
        .await?;
    tracing::info!(review_id = id, user_id = sender.user_id, "Review saved");

    state.reply(sender.chat_id, "✅ Спасибо за отзыв!").await;
    state
        .notify_admins(&format!("🆕 Новый отзыв от {}: {}", sender.name, text))
        .await;
    Ok(())
}

pub async fn show_reviews<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
) -> Result<(), BotError> {
    let reviews = state.store.list_reviews(PUBLIC_REVIEWS_LIMIT).await?;

    if reviews.is_empty() {
        state
            .offer(sender.chat_id, "Пока нет отзывов.", &keyboards::review_menu())
            .await;
        return Ok(());
    }

    let entries: Vec<String> = reviews
        .iter()
        .map(|r| format!("👤 {}: {} ({})\n\n", r.name, r.text, r.created_label()))
        .collect();
    let messages = pack_messages("💬 Отзывы:\n\n", &entries);

    // the button goes under the last page
    if let Some((last, first)) = messages.split_last() {
        for page in first {
            state.reply(sender.chat_id, page).await;
        }
        state
            .offer(sender.chat_id, last, &keyboards::review_menu())
            .await;
    }
    Ok(())
}

// ── Info ──

pub async fn contact<M: Messenger>(state: &BotState<M>, sender: &Sender) -> Result<(), BotError> {
    state.reply(sender.chat_id, &state.contact_text).await;
    Ok(())
}

pub async fn my_work<M: Messenger>(state: &BotState<M>, sender: &Sender) -> Result<(), BotError> {
    let text = match &state.portfolio_url {
        Some(url) => format!("🛠 Мои работы и отзывы: {url}"),
        None => "🛠 Портфолио скоро появится.".to_string(),
    };
    state.reply(sender.chat_id, &text).await;
    Ok(())
}
