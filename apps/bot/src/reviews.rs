use dashmap::DashSet;

/// Users whose next free-text message is a review.
///
/// Purely in-memory: a restart forgets every pending intent. Each operation is
/// atomic on its own; a `mark` racing a message from the same user may land
/// either side of it.
#[derive(Debug, Default)]
pub struct PendingReviews {
    users: DashSet<i64>,
}

impl PendingReviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the user was already pending.
    pub fn mark_pending(&self, user_id: i64) -> bool {
        self.users.insert(user_id)
    }

    /// The router checks with `take_pending`, which also consumes the marker.
    #[cfg(test)]
    pub fn is_pending(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }

    /// Returns `true` if the user was pending.
    pub fn clear_pending(&self, user_id: i64) -> bool {
        self.users.remove(&user_id).is_some()
    }

    /// Check-and-clear in one step. The router consumes the marker with this
    /// so the next message is captured at most once.
    pub fn take_pending(&self, user_id: i64) -> bool {
        self.clear_pending(user_id)
    }
}
