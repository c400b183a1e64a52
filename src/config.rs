use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    pub reminder_lead_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| "sqlite:./data/meetup.db".to_string());

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let lead_str =
            env::var("REMINDER_LEAD_MINUTES").unwrap_or_else(|_| "15".to_string());
        let reminder_lead_minutes: i64 = lead_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid REMINDER_LEAD_MINUTES"))?;
        if reminder_lead_minutes <= 0 {
            return Err(anyhow!("REMINDER_LEAD_MINUTES must be positive"));
        }

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            reminder_lead_minutes,
        })
    }
}
