/// Static allow-list of administrator ids, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    ids: Vec<i64>,
}

impl AdminGate {
    /// Keeps the first occurrence of each id, preserving order.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut unique = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self { ids: unique }
    }

    /// Check if `user_id` may perform administrative actions.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    /// Recipients of admin notifications, in configuration order.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}
