use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::requests::Request;
use teloxide::types::ParseMode;
use tokio::time::timeout;

/// Delivery channel seam. The bot proper sends through Telegram; tests plug
/// in recording or failing fakes. One call, one recipient, no retries.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<()>;
}

pub struct TelegramOutbox {
    bot: Bot,
    send_timeout: Duration,
}

impl TelegramOutbox {
    const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            send_timeout: Self::DEFAULT_SEND_TIMEOUT,
        }
    }
}

#[async_trait]
impl Outbox for TelegramOutbox {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = self.bot.send_message(ChatId(chat_id), text).send();
        timeout(self.send_timeout, request)
            .await
            .map_err(|_| anyhow!("send to {} timed out", chat_id))?
            .map_err(|e| anyhow!("send to {} failed: {}", chat_id, e))?;
        Ok(())
    }

    async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown)
            .send();
        timeout(self.send_timeout, request)
            .await
            .map_err(|_| anyhow!("send to {} timed out", chat_id))?
            .map_err(|e| anyhow!("send to {} failed: {}", chat_id, e))?;
        Ok(())
    }
}
