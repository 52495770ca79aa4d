use chrono::NaiveDateTime;

/// Format of booking dates shown to users and stored in `bookings.date`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";
/// Format of `reviews.created_at` (ISO-8601, local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Bookable slots, identical for every day.
pub const TIME_SLOTS: [&str; 6] = ["10:00", "11:00", "12:00", "14:00", "15:00", "16:00"];

// ── Database models ──

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub date: String,
    pub time: String,
    pub comment: Option<String>,
}

/// Typed view of the nullable `comment` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentState<'a> {
    Awaiting,
    Skipped,
    Provided(&'a str),
}

impl Booking {
    pub fn comment_state(&self) -> CommentState<'_> {
        match self.comment.as_deref() {
            None => CommentState::Awaiting,
            Some("") => CommentState::Skipped,
            Some(text) => CommentState::Provided(text),
        }
    }

    /// `"25.12.2025 14:00"`
    pub fn slot_label(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub text: String,
    pub created_at: String,
}

impl Review {
    /// Creation time as `DD.MM.YYYY HH:MM`, or the raw column if it does not parse.
    pub fn created_label(&self) -> String {
        NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map(|ts| ts.format("%d.%m.%Y %H:%M").to_string())
            .unwrap_or_else(|_| self.created_at.clone())
    }
}

// ── Validation ──

/// Strict `DD.MM.YYYY`: chrono alone would also take `1.1.2026`.
pub fn is_valid_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, DATE_FORMAT)
        .is_ok_and(|d| d.format(DATE_FORMAT).to_string() == date)
}

pub fn is_valid_time_slot(time: &str) -> bool {
    TIME_SLOTS.contains(&time)
}
