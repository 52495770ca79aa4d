use chrono::{NaiveDate, TimeDelta};

use crate::callback::CallbackData;
use crate::models::{Booking, DATE_FORMAT, TIME_SLOTS};
use crate::notify::Choice;

/// Days offered for booking and rescheduling, today included.
pub const BOOKING_WINDOW_DAYS: i64 = 7;

/// `BOOKING_WINDOW_DAYS` consecutive dates starting at `from`, as `DD.MM.YYYY`.
pub fn upcoming_dates(from: NaiveDate) -> Vec<String> {
    (0..BOOKING_WINDOW_DAYS)
        .map(|i| (from + TimeDelta::days(i)).format(DATE_FORMAT).to_string())
        .collect()
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn date_choices(from: NaiveDate) -> Vec<Choice> {
    upcoming_dates(from)
        .into_iter()
        .map(|d| Choice::new(d.clone(), CallbackData::Date(d).to_string()))
        .collect()
}

pub fn time_choices(date: &str) -> Vec<Choice> {
    TIME_SLOTS
        .iter()
        .map(|t| {
            let payload = CallbackData::Time {
                date: date.to_string(),
                time: t.to_string(),
            };
            Choice::new(*t, payload.to_string())
        })
        .collect()
}

pub fn main_menu() -> Vec<Choice> {
    vec![
        Choice::new("📞 Связаться", CallbackData::Contact.to_string()),
        Choice::new("🛠 Мои работы", CallbackData::MyWork.to_string()),
        Choice::new("💬 Отзывы", CallbackData::Reviews.to_string()),
    ]
}

pub fn review_menu() -> Vec<Choice> {
    vec![Choice::new("Оставить отзыв", CallbackData::LeaveReview.to_string())]
}

pub fn admin_menu() -> Vec<Choice> {
    vec![
        Choice::new("📋 Просмотреть все записи", CallbackData::AdminView.to_string()),
        Choice::new("❌ Отменить запись", CallbackData::AdminCancel.to_string()),
        Choice::new("✏️ Изменить дату записи", CallbackData::AdminEdit.to_string()),
        Choice::new("📝 Отзывы", CallbackData::AdminReviews.to_string()),
    ]
}

pub fn cancel_choices(bookings: &[Booking]) -> Vec<Choice> {
    bookings
        .iter()
        .map(|b| {
            Choice::new(
                format!("Отменить: {} ({})", b.name, b.slot_label()),
                CallbackData::CancelId(b.id).to_string(),
            )
        })
        .collect()
}

pub fn edit_choices(bookings: &[Booking]) -> Vec<Choice> {
    bookings
        .iter()
        .map(|b| {
            Choice::new(
                format!("Изменить: {} ({})", b.name, b.slot_label()),
                CallbackData::EditId(b.id).to_string(),
            )
        })
        .collect()
}

pub fn new_date_choices(booking_id: i64, from: NaiveDate) -> Vec<Choice> {
    upcoming_dates(from)
        .into_iter()
        .map(|date| {
            let label = date.clone();
            Choice::new(label, CallbackData::NewDate { booking_id, date }.to_string())
        })
        .collect()
}
