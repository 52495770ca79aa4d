//! Inline button payloads: `<action>_<args...>`.
//!
//! Dates use `.` and times use `:`, so `_` only ever separates fields.

use std::fmt;

use crate::models::{is_valid_date, is_valid_time_slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    Date(String),
    Time { date: String, time: String },
    Contact,
    MyWork,
    Reviews,
    LeaveReview,
    AdminView,
    AdminReviews,
    AdminCancel,
    CancelId(i64),
    AdminEdit,
    EditId(i64),
    NewDate { booking_id: i64, date: String },
}

impl CallbackData {
    /// `None` for unknown actions or malformed arguments.
    pub fn parse(data: &str) -> Option<Self> {
        let parsed = match data {
            "contact" => Self::Contact,
            "mywork" => Self::MyWork,
            "reviews" => Self::Reviews,
            "leave_review" => Self::LeaveReview,
            "admin_view" => Self::AdminView,
            "admin_reviews" => Self::AdminReviews,
            "admin_cancel" => Self::AdminCancel,
            "admin_edit" => Self::AdminEdit,
            _ => return Self::parse_with_args(data),
        };
        Some(parsed)
    }

    fn parse_with_args(data: &str) -> Option<Self> {
        if let Some(id) = data.strip_prefix("cancel_id_") {
            return id.parse().ok().map(Self::CancelId);
        }
        if let Some(id) = data.strip_prefix("edit_id_") {
            return id.parse().ok().map(Self::EditId);
        }
        if let Some(rest) = data.strip_prefix("new_date_") {
            let (id, date) = rest.split_once('_')?;
            let booking_id = id.parse().ok()?;
            return is_valid_date(date).then(|| Self::NewDate {
                booking_id,
                date: date.to_string(),
            });
        }
        if let Some(rest) = data.strip_prefix("time_") {
            let (date, time) = rest.rsplit_once('_')?;
            return (is_valid_date(date) && is_valid_time_slot(time)).then(|| Self::Time {
                date: date.to_string(),
                time: time.to_string(),
            });
        }
        if let Some(date) = data.strip_prefix("date_") {
            return is_valid_date(date).then(|| Self::Date(date.to_string()));
        }
        None
    }

    /// Actions behind the admin allow-list.
    pub fn is_admin_action(&self) -> bool {
        matches!(
            self,
            Self::AdminView
                | Self::AdminReviews
                | Self::AdminCancel
                | Self::CancelId(_)
                | Self::AdminEdit
                | Self::EditId(_)
                | Self::NewDate { .. }
        )
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "date_{date}"),
            Self::Time { date, time } => write!(f, "time_{date}_{time}"),
            Self::Contact => f.write_str("contact"),
            Self::MyWork => f.write_str("mywork"),
            Self::Reviews => f.write_str("reviews"),
            Self::LeaveReview => f.write_str("leave_review"),
            Self::AdminView => f.write_str("admin_view"),
            Self::AdminReviews => f.write_str("admin_reviews"),
            Self::AdminCancel => f.write_str("admin_cancel"),
            Self::CancelId(id) => write!(f, "cancel_id_{id}"),
            Self::AdminEdit => f.write_str("admin_edit"),
            Self::EditId(id) => write!(f, "edit_id_{id}"),
            Self::NewDate { booking_id, date } => write!(f, "new_date_{booking_id}_{date}"),
        }
    }
}
