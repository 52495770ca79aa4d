use anyhow::{bail, Context};

const DEFAULT_DATABASE_URL: &str = "sqlite:bookings.db?mode=rwc";
const DEFAULT_CONTACT_TEXT: &str = "📞 Напишите нам в этот чат, администратор ответит в ближайшее время.";

/// Startup configuration, read once from the environment. Not `Debug`: it
/// carries the bot token.
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    pub admin_ids: Vec<i64>,
    pub contact_text: String,
    pub portfolio_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bot_token = get("BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .context("BOT_TOKEN must be set")?;

        // ADMIN_ID is the single-admin form used by older deployments.
        let admin_ids = match get("ADMIN_IDS").or_else(|| get("ADMIN_ID")) {
            Some(raw) => parse_admin_ids(&raw)?,
            None => Vec::new(),
        };

        let database_url = get("DATABASE_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let contact_text = get("CONTACT_TEXT")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTACT_TEXT.into());

        let portfolio_url = get("PORTFOLIO_URL").filter(|u| !u.trim().is_empty());

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            contact_text,
            portfolio_url,
        })
    }
}

/// `"1, 2,,3"` → `[1, 2, 3]`. Blank entries are skipped; anything else that
/// is not an integer is an error.
pub fn parse_admin_ids(raw: &str) -> anyhow::Result<Vec<i64>> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => bail!("ADMIN_IDS contains a non-numeric id: {part:?}"),
        }
    }
    Ok(ids)
}
