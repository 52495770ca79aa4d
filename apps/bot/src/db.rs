use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::models::{Booking, Review, TIMESTAMP_FORMAT};

/// Columns added to `bookings` after the first release. Older databases get
/// them via `ALTER TABLE` on startup.
const LATE_BOOKING_COLUMNS: [(&str, &str); 2] = [("time", "TEXT"), ("comment", "TEXT")];

/// Legacy rows may carry NULLs in columns that later became mandatory.
const BOOKING_SELECT: &str = "SELECT id, COALESCE(user_id, 0) AS user_id,
        COALESCE(name, '') AS name, COALESCE(date, '') AS date,
        COALESCE(time, '') AS time, comment
     FROM bookings";

/// Outcome of an idempotent column add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnChange {
    Added,
    AlreadyPresent,
}

/// SQLite-backed owner of bookings and reviews.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(3)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and bring an older `bookings` table up to date. Safe to
    /// call any number of times.
    pub async fn initialize(&self) -> Result<(), sqlx::Error> {
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                name TEXT,
                date TEXT,
                time TEXT,
                comment TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        for (column, decl) in LATE_BOOKING_COLUMNS {
            if self.add_column_if_missing("bookings", column, decl).await? == ColumnChange::Added {
                tracing::info!("Added column bookings.{}", column);
            }
        }

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Database schema up to date");
        Ok(())
    }

    async fn add_column_if_missing(
        &self,
        table: &str,
        column: &str,
        decl: &str,
    ) -> Result<ColumnChange, sqlx::Error> {
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
                .bind(table)
                .fetch_all(&self.pool)
                .await?;
        if existing.iter().any(|c| c == column) {
            return Ok(ColumnChange::AlreadyPresent);
        }

        let alter = format!("ALTER TABLE {table} ADD COLUMN {column} {decl}");
        match sqlx::query(&alter).execute(&self.pool).await {
            Ok(_) => Ok(ColumnChange::Added),
            // Another process may have added it between the check and the ALTER.
            Err(sqlx::Error::Database(e)) if e.message().contains("duplicate column name") => {
                Ok(ColumnChange::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }

    // ── Bookings ──

    pub async fn create_booking(
        &self,
        user_id: i64,
        name: &str,
        date: &str,
        time: &str,
    ) -> Result<i64, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO bookings (user_id, name, date, time, comment) VALUES (?, ?, ?, ?, NULL)",
        )
        .bind(user_id)
        .bind(name)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// An empty `comment` marks the comment as skipped.
    pub async fn set_booking_comment(&self, id: i64, comment: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE bookings SET comment = ? WHERE id = ?")
            .bind(comment)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Newest booking of `user_id` still waiting for a comment.
    pub async fn find_latest_open_booking(&self, user_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM bookings WHERE user_id = ? AND comment IS NULL
             ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!("{BOOKING_SELECT} ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_booking(&self, id: i64) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!("{BOOKING_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Returns `false` if no such booking existed.
    pub async fn delete_booking(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Moves a booking to `new_date`; time and comment stay as they are.
    pub async fn reschedule_booking(&self, id: i64, new_date: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE bookings SET date = ? WHERE id = ?")
            .bind(new_date)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Reviews ──

    pub async fn create_review(
        &self,
        user_id: i64,
        name: &str,
        text: &str,
    ) -> Result<i64, sqlx::Error> {
        let created_at = chrono::Local::now()
            .naive_local()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let id = sqlx::query(
            "INSERT INTO reviews (user_id, name, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(name)
        .bind(text)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Most recent first.
    pub async fn list_reviews(&self, limit: i64) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT id, user_id, name, text, created_at FROM reviews
             ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
