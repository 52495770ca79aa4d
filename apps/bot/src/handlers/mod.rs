//! Conversation router: every inbound update ends up in exactly one handler.
//!
//! Per-user state is never stored. It is inferred from the pending-review set
//! and from whether the user has a booking with a NULL comment.

pub mod admin;
pub mod client;

use std::borrow::Cow;

use crate::callback::CallbackData;
use crate::error::BotError;
use crate::notify::Messenger;
use crate::{BotState, Command};

/// Telegram caps a message at 4096 characters; stay a little below.
const MAX_MESSAGE_CHARS: usize = 4000;

/// Who an event came from and where to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: i64,
    /// First name at the time of the event.
    pub name: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub enum Event {
    Command(Command),
    /// Raw callback payload of an inline button.
    Button(String),
    Text(String),
}

/// Route one event and absorb its failure. Nothing escapes to the dispatcher,
/// so one bad update never affects the next.
pub async fn dispatch<M: Messenger>(state: &BotState<M>, sender: &Sender, event: Event) {
    let outcome = match event {
        Event::Command(cmd) => on_command(state, sender, cmd).await,
        Event::Button(data) => on_button(state, sender, &data).await,
        Event::Text(text) => on_text(state, sender, &text).await,
    };

    if let Err(err) = outcome {
        report(state, sender, err).await;
    }
}

async fn on_command<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    cmd: Command,
) -> Result<(), BotError> {
    match cmd {
        Command::Start => client::start(state, sender).await,
        Command::Review => client::request_review(state, sender).await,
        Command::Skip => client::skip_comment(state, sender).await,
        Command::Admin => admin::panel(state, sender).await,
    }
}

async fn on_button<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    data: &str,
) -> Result<(), BotError> {
    let action =
        CallbackData::parse(data).ok_or_else(|| BotError::InvalidPayload(data.to_string()))?;

    if action.is_admin_action() {
        require_admin(state, sender)?;
    }

    match action {
        CallbackData::Date(date) => client::choose_date(state, sender, &date).await,
        CallbackData::Time { date, time } => client::book(state, sender, &date, &time).await,
        CallbackData::Contact => client::contact(state, sender).await,
        CallbackData::MyWork => client::my_work(state, sender).await,
        CallbackData::Reviews => client::show_reviews(state, sender).await,
        CallbackData::LeaveReview => client::request_review(state, sender).await,
        CallbackData::AdminView => admin::view_bookings(state, sender).await,
        CallbackData::AdminReviews => admin::view_reviews(state, sender).await,
        CallbackData::AdminCancel => admin::cancel_menu(state, sender).await,
        CallbackData::CancelId(id) => admin::cancel(state, sender, id).await,
        CallbackData::AdminEdit => admin::edit_menu(state, sender).await,
        CallbackData::EditId(id) => admin::pick_new_date(state, sender, id).await,
        CallbackData::NewDate { booking_id, date } => {
            admin::reschedule(state, sender, booking_id, &date).await
        }
    }
}

/// A pending review always wins over an open booking.
async fn on_text<M: Messenger>(
    state: &BotState<M>,
    sender: &Sender,
    text: &str,
) -> Result<(), BotError> {
    if text.starts_with('/') {
        // unknown command
        return Ok(());
    }

    if state.pending.take_pending(sender.user_id) {
        return client::capture_review(state, sender, text).await;
    }

    client::capture_comment(state, sender, text).await
}

pub(crate) fn require_admin<M>(state: &BotState<M>, sender: &Sender) -> Result<(), BotError> {
    if state.admins.is_admin(sender.user_id) {
        Ok(())
    } else {
        Err(BotError::Forbidden)
    }
}

async fn report<M: Messenger>(state: &BotState<M>, sender: &Sender, err: BotError) {
    match err {
        BotError::Store(e) => {
            tracing::error!(user_id = sender.user_id, "handler failed: {}", e);
            state
                .reply(sender.chat_id, "❌ Произошла ошибка. Попробуйте позже.")
                .await;
        }
        BotError::Forbidden => {
            state.reply(sender.chat_id, "❌ Доступ запрещён").await;
        }
        BotError::NotFound(id) => {
            tracing::info!(booking_id = id, "booking not found");
            state.reply(sender.chat_id, "❌ Запись не найдена").await;
        }
        BotError::InvalidPayload(data) => {
            tracing::warn!(user_id = sender.user_id, "ignoring callback {:?}", data);
        }
    }
}

/// Join `header` and `entries` into as few messages as fit the size limit.
/// An entry is never split across messages; one longer than a whole message
/// is cut short and marked with `…`.
pub(crate) fn pack_messages(header: &str, entries: &[String]) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = header.to_string();
    let mut current_len = current.chars().count();

    for entry in entries {
        let entry = fit_message(entry);
        let len = entry.chars().count();
        if current_len + len > MAX_MESSAGE_CHARS && current_len > 0 {
            messages.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&entry);
        current_len += len;
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

fn fit_message(entry: &str) -> Cow<'_, str> {
    if entry.chars().count() <= MAX_MESSAGE_CHARS {
        return Cow::Borrowed(entry);
    }
    let mut cut: String = entry.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    cut.push('…');
    Cow::Owned(cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::{test_state, RecordingMessenger};
    use crate::notify::MAX_KEYBOARD_CHOICES;

    const ADMIN_A: i64 = 1000;
    const ADMIN_B: i64 = 2000;
    const USER: i64 = 42;

    fn user() -> Sender {
        Sender {
            user_id: USER,
            name: "Anna".into(),
            chat_id: USER,
        }
    }

    fn admin() -> Sender {
        Sender {
            user_id: ADMIN_A,
            name: "Boss".into(),
            chat_id: ADMIN_A,
        }
    }

    async fn state() -> BotState<RecordingMessenger> {
        test_state(&[ADMIN_A, ADMIN_B], RecordingMessenger::default()).await
    }

    async fn press(state: &BotState<RecordingMessenger>, sender: &Sender, data: &str) {
        dispatch(state, sender, Event::Button(data.into())).await;
    }

    async fn say(state: &BotState<RecordingMessenger>, sender: &Sender, text: &str) {
        dispatch(state, sender, Event::Text(text.into())).await;
    }

    async fn command(state: &BotState<RecordingMessenger>, sender: &Sender, cmd: Command) {
        dispatch(state, sender, Event::Command(cmd)).await;
    }

    fn last_text(state: &BotState<RecordingMessenger>, chat_id: i64) -> String {
        state
            .messenger
            .sent_to(chat_id)
            .last()
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }

    // ── Booking flow ──

    #[tokio::test]
    async fn test_booking_end_to_end() {
        let state = state().await;
        let anna = user();

        command(&state, &anna, Command::Start).await;
        let sent = state.messenger.sent_to(USER);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].choices.len(), 7);
        assert!(sent[0].choices.iter().all(|c| c.payload.starts_with("date_")));
        assert_eq!(sent[1].choices.len(), 3);

        state.messenger.clear();
        press(&state, &anna, "date_25.12.2025").await;
        let sent = state.messenger.sent_to(USER);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("25.12.2025"));
        let labels: Vec<&str> = sent[0].choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["10:00", "11:00", "12:00", "14:00", "15:00", "16:00"]);

        press(&state, &anna, "time_25.12.2025_14:00").await;

        let bookings = state.store.list_bookings().await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].name, "Anna");
        assert_eq!(bookings[0].date, "25.12.2025");
        assert_eq!(bookings[0].time, "14:00");
        assert_eq!(bookings[0].comment, None);

        for admin_id in [ADMIN_A, ADMIN_B] {
            let note = last_text(&state, admin_id);
            assert!(note.contains("Anna"), "{note}");
            assert!(note.contains("25.12.2025 14:00"), "{note}");
        }
        assert!(last_text(&state, USER).contains("/skip"));
    }

    #[tokio::test]
    async fn test_each_time_selection_creates_one_booking() {
        let state = state().await;
        let anna = user();
        press(&state, &anna, "time_25.12.2025_10:00").await;
        press(&state, &anna, "time_26.12.2025_11:00").await;
        assert_eq!(state.store.list_bookings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_same_slot_can_be_booked_twice() {
        let state = state().await;
        let other = Sender {
            user_id: 7,
            name: "Olga".into(),
            chat_id: 7,
        };
        press(&state, &user(), "time_25.12.2025_14:00").await;
        press(&state, &other, "time_25.12.2025_14:00").await;
        assert_eq!(state.store.list_bookings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_booking_survives_unreachable_admin() {
        let state = test_state(&[ADMIN_A, ADMIN_B], RecordingMessenger::with_unreachable([ADMIN_A])).await;
        press(&state, &user(), "time_25.12.2025_14:00").await;

        assert_eq!(state.store.list_bookings().await.unwrap().len(), 1);
        assert!(last_text(&state, ADMIN_B).contains("Anna"));
        assert!(last_text(&state, USER).contains("25.12.2025"));
    }

    // ── Comments ──

    #[tokio::test]
    async fn test_free_text_becomes_comment() {
        let state = state().await;
        let anna = user();
        press(&state, &anna, "time_25.12.2025_14:00").await;
        say(&state, &anna, "  first visit  ").await;

        let booking = state.store.list_bookings().await.unwrap().remove(0);
        assert_eq!(booking.comment.as_deref(), Some("first visit"));
        assert_eq!(state.store.find_latest_open_booking(USER).await.unwrap(), None);
        assert!(last_text(&state, ADMIN_B).contains("first visit"));
    }

    #[tokio::test]
    async fn test_comment_targets_newest_open_booking() {
        let state = state().await;
        let anna = user();
        press(&state, &anna, "time_25.12.2025_10:00").await;
        press(&state, &anna, "time_26.12.2025_11:00").await;
        say(&state, &anna, "for the second one").await;

        let bookings = state.store.list_bookings().await.unwrap();
        assert_eq!(bookings[0].comment, None);
        assert_eq!(bookings[1].comment.as_deref(), Some("for the second one"));
    }

    #[tokio::test]
    async fn test_skip_then_text_gets_guidance() {
        let state = state().await;
        let anna = user();
        press(&state, &anna, "time_25.12.2025_14:00").await;
        command(&state, &anna, Command::Skip).await;

        let booking = state.store.list_bookings().await.unwrap().remove(0);
        assert_eq!(booking.comment.as_deref(), Some(""));

        say(&state, &anna, "hello?").await;
        assert!(last_text(&state, USER).contains("/start"));
        let booking = state.store.list_bookings().await.unwrap().remove(0);
        assert_eq!(booking.comment.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_skip_without_open_booking() {
        let state = state().await;
        command(&state, &user(), Command::Skip).await;
        assert_eq!(last_text(&state, USER), "Нет ожидающих комментариев.");
    }

    #[tokio::test]
    async fn test_text_without_booking_gets_guidance() {
        let state = state().await;
        say(&state, &user(), "hi").await;
        assert!(last_text(&state, USER).contains("/start"));
        assert!(state.store.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_text_is_ignored() {
        let state = state().await;
        let anna = user();
        press(&state, &anna, "time_25.12.2025_14:00").await;
        state.messenger.clear();

        say(&state, &anna, "/help").await;

        assert!(state.messenger.sent().is_empty());
        assert!(state.store.find_latest_open_booking(USER).await.unwrap().is_some());
    }

    // ── Reviews ──

    #[tokio::test]
    async fn test_review_flow() {
        let state = state().await;
        let anna = user();
        command(&state, &anna, Command::Review).await;
        assert!(state.pending.is_pending(USER));

        say(&state, &anna, " Lovely work ").await;

        let reviews = state.store.list_reviews(10).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].text, "Lovely work");
        assert_eq!(reviews[0].name, "Anna");
        assert!(!state.pending.is_pending(USER));
        assert!(last_text(&state, ADMIN_A).contains("Lovely work"));
    }

    #[tokio::test]
    async fn test_pending_review_beats_open_booking() {
        let state = state().await;
        let anna = user();
        press(&state, &anna, "time_25.12.2025_14:00").await;
        press(&state, &anna, "leave_review").await;

        say(&state, &anna, "great").await;

        assert_eq!(state.store.list_reviews(10).await.unwrap().len(), 1);
        let booking = state.store.list_bookings().await.unwrap().remove(0);
        assert_eq!(booking.comment, None);

        // the next message goes back to the booking
        say(&state, &anna, "now a comment").await;
        let booking = state.store.list_bookings().await.unwrap().remove(0);
        assert_eq!(booking.comment.as_deref(), Some("now a comment"));
    }

    #[tokio::test]
    async fn test_blank_review_is_rejected_and_consumed() {
        let state = state().await;
        let anna = user();
        command(&state, &anna, Command::Review).await;
        say(&state, &anna, "   ").await;

        assert!(state.store.list_reviews(10).await.unwrap().is_empty());
        assert!(!state.pending.is_pending(USER));
    }

    #[tokio::test]
    async fn test_failed_review_clears_pending() {
        let state = state().await;
        let anna = user();
        command(&state, &anna, Command::Review).await;
        sqlx::query("DROP TABLE reviews")
            .execute(state.store.pool())
            .await
            .unwrap();

        say(&state, &anna, "great").await;

        assert!(!state.pending.is_pending(USER));
        assert_eq!(last_text(&state, USER), "❌ Произошла ошибка. Попробуйте позже.");
    }

    #[tokio::test]
    async fn test_show_reviews_newest_first() {
        let state = state().await;
        state.store.create_review(1, "Old", "first").await.unwrap();
        state.store.create_review(2, "New", "second").await.unwrap();

        press(&state, &user(), "reviews").await;

        let sent = state.messenger.sent_to(USER).pop().unwrap();
        let first = sent.text.find("second").unwrap();
        let second = sent.text.find("first").unwrap();
        assert!(first < second);
        assert_eq!(sent.choices[0].payload, "leave_review");
    }

    #[tokio::test]
    async fn test_show_reviews_empty() {
        let state = state().await;
        press(&state, &user(), "reviews").await;
        assert_eq!(last_text(&state, USER), "Пока нет отзывов.");
    }

    // ── Info buttons ──

    #[tokio::test]
    async fn test_contact_and_portfolio() {
        let state = state().await;
        press(&state, &user(), "contact").await;
        assert_eq!(last_text(&state, USER), "📞 Contact: @studio");
        press(&state, &user(), "mywork").await;
        assert!(last_text(&state, USER).contains("https://t.me/studio_works"));
    }

    // ── Admin gate ──

    #[tokio::test]
    async fn test_non_admin_is_denied() {
        let state = state().await;
        let anna = user();
        let id = state
            .store
            .create_booking(USER, "Anna", "25.12.2025", "14:00")
            .await
            .unwrap();

        command(&state, &anna, Command::Admin).await;
        assert_eq!(last_text(&state, USER), "❌ Доступ запрещён");

        for data in ["admin_view", "admin_reviews", "admin_cancel", "admin_edit"] {
            press(&state, &anna, data).await;
            assert_eq!(last_text(&state, USER), "❌ Доступ запрещён");
        }

        press(&state, &anna, &format!("cancel_id_{id}")).await;
        press(&state, &anna, &format!("new_date_{id}_01.01.2026")).await;

        let booking = state.store.get_booking(id).await.unwrap().unwrap();
        assert_eq!(booking.date, "25.12.2025");
        assert!(state.messenger.sent_to(ADMIN_A).is_empty());
    }

    #[tokio::test]
    async fn test_admin_panel() {
        let state = state().await;
        command(&state, &admin(), Command::Admin).await;
        let sent = state.messenger.sent_to(ADMIN_A).pop().unwrap();
        let payloads: Vec<&str> = sent.choices.iter().map(|c| c.payload.as_str()).collect();
        assert_eq!(payloads, ["admin_view", "admin_cancel", "admin_edit", "admin_reviews"]);
    }

    // ── Admin cancel / reschedule ──

    #[tokio::test]
    async fn test_cancel_then_cancel_again_is_not_found() {
        let state = state().await;
        let boss = admin();
        for day in 1..=7 {
            state
                .store
                .create_booking(USER, "Anna", &format!("{day:02}.01.2026"), "10:00")
                .await
                .unwrap();
        }

        press(&state, &boss, "admin_cancel").await;
        let menu = state.messenger.sent_to(ADMIN_A).pop().unwrap();
        assert_eq!(menu.choices.len(), 7);
        assert!(menu.choices.iter().any(|c| c.payload == "cancel_id_7"));

        press(&state, &boss, "cancel_id_7").await;
        let ids: Vec<i64> = state
            .store
            .list_bookings()
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(!ids.contains(&7));
        assert_eq!(ids.len(), 6);
        assert!(last_text(&state, USER).contains("07.01.2026 10:00"));

        press(&state, &boss, "cancel_id_7").await;
        assert_eq!(last_text(&state, ADMIN_A), "❌ Запись не найдена");
    }

    #[tokio::test]
    async fn test_large_admin_menus_fit_keyboards() {
        let state = state().await;
        let boss = admin();
        for i in 0..150 {
            state
                .store
                .create_booking(100 + i, "Client", "25.12.2025", "10:00")
                .await
                .unwrap();
        }

        for (action, prefix) in [("admin_cancel", "cancel_id_"), ("admin_edit", "edit_id_")] {
            state.messenger.clear();
            press(&state, &boss, action).await;

            let sent = state.messenger.sent_to(ADMIN_A);
            assert_eq!(sent.len(), 2);
            assert!(sent.iter().all(|s| s.choices.len() <= MAX_KEYBOARD_CHOICES));

            let payloads: Vec<String> = sent
                .iter()
                .flat_map(|s| s.choices.iter().map(|c| c.payload.clone()))
                .collect();
            let expected: Vec<String> = (1..=150).map(|id| format!("{prefix}{id}")).collect();
            assert_eq!(payloads, expected);
        }
    }

    #[tokio::test]
    async fn test_admin_reviews_long_text_is_delivered() {
        let state = state().await;
        state
            .store
            .create_review(USER, "Anna", &"w".repeat(4096))
            .await
            .unwrap();

        press(&state, &admin(), "admin_reviews").await;

        let sent = state.messenger.sent_to(ADMIN_A);
        assert!(!sent.is_empty());
        assert!(sent.iter().all(|s| s.text.chars().count() <= MAX_MESSAGE_CHARS));
        assert!(sent.iter().any(|s| s.text.contains("Anna [42]")));
    }

    #[tokio::test]
    async fn test_cancel_with_unreachable_user_still_deletes() {
        let state = test_state(&[ADMIN_A], RecordingMessenger::with_unreachable([USER])).await;
        let id = state
            .store
            .create_booking(USER, "Anna", "25.12.2025", "14:00")
            .await
            .unwrap();

        press(&state, &admin(), &format!("cancel_id_{id}")).await;

        assert!(state.store.get_booking(id).await.unwrap().is_none());
        assert!(last_text(&state, ADMIN_A).contains("Anna"));
    }

    #[tokio::test]
    async fn test_reschedule_flow() {
        let state = state().await;
        let boss = admin();
        state.store.create_booking(10, "A", "25.12.2025", "10:00").await.unwrap();
        state.store.create_booking(11, "B", "25.12.2025", "11:00").await.unwrap();
        let id = state
            .store
            .create_booking(USER, "Anna", "25.12.2025", "14:00")
            .await
            .unwrap();
        assert_eq!(id, 3);
        state.store.set_booking_comment(id, "window seat").await.unwrap();

        press(&state, &boss, "admin_edit").await;
        let menu = state.messenger.sent_to(ADMIN_A).pop().unwrap();
        assert_eq!(menu.choices.len(), 3);

        press(&state, &boss, "edit_id_3").await;
        let dates = state.messenger.sent_to(ADMIN_A).pop().unwrap();
        assert_eq!(dates.choices.len(), 7);
        assert!(dates.choices.iter().all(|c| c.payload.starts_with("new_date_3_")));

        press(&state, &boss, "new_date_3_01.01.2026").await;

        let booking = state.store.get_booking(3).await.unwrap().unwrap();
        assert_eq!(booking.date, "01.01.2026");
        assert_eq!(booking.time, "14:00");
        assert_eq!(booking.comment.as_deref(), Some("window seat"));
        assert!(last_text(&state, USER).contains("01.01.2026"));

        let others = state.store.get_booking(1).await.unwrap().unwrap();
        assert_eq!(others.date, "25.12.2025");
    }

    #[tokio::test]
    async fn test_edit_missing_booking() {
        let state = state().await;
        press(&state, &admin(), "edit_id_99").await;
        assert_eq!(last_text(&state, ADMIN_A), "❌ Запись не найдена");
        press(&state, &admin(), "new_date_99_01.01.2026").await;
        assert_eq!(last_text(&state, ADMIN_A), "❌ Запись не найдена");
    }

    #[tokio::test]
    async fn test_admin_view_lists_comments() {
        let state = state().await;
        let a = state.store.create_booking(10, "A", "25.12.2025", "10:00").await.unwrap();
        state.store.create_booking(11, "B", "26.12.2025", "11:00").await.unwrap();
        state.store.set_booking_comment(a, "bring photos").await.unwrap();

        press(&state, &admin(), "admin_view").await;

        let text = last_text(&state, ADMIN_A);
        assert!(text.contains("ID: 1"));
        assert!(text.contains("bring photos"));
        assert!(text.contains("26.12.2025 11:00"));
        assert!(text.contains("Комментарий: -"));
    }

    #[tokio::test]
    async fn test_admin_empty_lists() {
        let state = state().await;
        press(&state, &admin(), "admin_view").await;
        assert_eq!(last_text(&state, ADMIN_A), "Записей пока нет.");
        press(&state, &admin(), "admin_cancel").await;
        assert_eq!(last_text(&state, ADMIN_A), "Нет записей для отмены.");
        press(&state, &admin(), "admin_edit").await;
        assert_eq!(last_text(&state, ADMIN_A), "Нет записей для изменения.");
        press(&state, &admin(), "admin_reviews").await;
        assert_eq!(last_text(&state, ADMIN_A), "Отзывы отсутствуют.");
    }

    #[tokio::test]
    async fn test_admin_reviews_show_ids() {
        let state = state().await;
        state.store.create_review(USER, "Anna", "superb").await.unwrap();
        press(&state, &admin(), "admin_reviews").await;
        let text = last_text(&state, ADMIN_A);
        assert!(text.contains("ID:1"));
        assert!(text.contains("Anna [42]: superb"));
    }

    // ── Failure isolation ──

    #[tokio::test]
    async fn test_invalid_payload_is_silent() {
        let state = state().await;
        press(&state, &user(), "time_25.12.2025_13:00").await;
        press(&state, &user(), "bogus").await;
        assert!(state.messenger.sent().is_empty());
        assert!(state.store.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_gets_generic_reply() {
        let state = state().await;
        sqlx::query("DROP TABLE bookings")
            .execute(state.store.pool())
            .await
            .unwrap();

        press(&state, &user(), "time_25.12.2025_14:00").await;

        assert_eq!(last_text(&state, USER), "❌ Произошла ошибка. Попробуйте позже.");
        assert!(state.messenger.sent_to(ADMIN_A).is_empty());

        // next event is handled normally
        press(&state, &user(), "contact").await;
        assert_eq!(last_text(&state, USER), "📞 Contact: @studio");
    }

    // ── Message packing ──

    #[test]
    fn test_pack_messages_single() {
        let entries = vec!["a\n".to_string(), "b\n".to_string()];
        assert_eq!(pack_messages("H\n", &entries), vec!["H\na\nb\n"]);
    }

    #[test]
    fn test_pack_messages_splits_on_entry_boundary() {
        let entry = "x".repeat(1500);
        let entries = vec![entry.clone(), entry.clone(), entry.clone()];
        let messages = pack_messages("", &entries);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], entry.repeat(2));
        assert_eq!(messages[1], entry);
    }

    #[test]
    fn test_pack_messages_oversized_entry_truncated() {
        let big = "y".repeat(MAX_MESSAGE_CHARS + 96);
        let messages = pack_messages("head", &[big, "tail".to_string()]);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "head");
        assert_eq!(messages[1].chars().count(), MAX_MESSAGE_CHARS);
        assert!(messages[1].ends_with('…'));
        assert_eq!(messages[2], "tail");
        assert!(messages.iter().all(|m| m.chars().count() <= MAX_MESSAGE_CHARS));
    }

    #[test]
    fn test_pack_messages_entry_at_limit_untouched() {
        let exact = "z".repeat(MAX_MESSAGE_CHARS);
        let messages = pack_messages("", &[exact.clone()]);
        assert_eq!(messages, vec![exact]);
    }
}
