pub mod callback;
pub mod message;
pub mod text;

use std::sync::Arc;
use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::commands::Command;
use crate::database::connection::DatabaseManager;
use crate::flows::FlowEngine;
use crate::services::outbox::Outbox;

/// Endpoint result type matching the schema's error type.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub struct BotHandler {
    pub db: DatabaseManager,
    pub engine: Arc<FlowEngine>,
    pub outbox: Arc<dyn Outbox>,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, engine: Arc<FlowEngine>, outbox: Arc<dyn Outbox>) -> Self {
        Self { db, engine, outbox }
    }

    /// Update routing: slash commands, then callback buttons, then free text.
    /// Free text goes through the flow engine before the menu router sees it.
    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let command_db = self.db.clone();
        let command_outbox = self.outbox.clone();
        let callback_db = self.db.clone();
        let text_db = self.db.clone();
        let text_engine = self.engine.clone();
        let text_outbox = self.outbox.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let db = command_db.clone();
                        let outbox = command_outbox.clone();
                        async move { message::command_handler(bot, msg, cmd, db, outbox).await }
                    }),
            )
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let db = callback_db.clone();
                    async move { callback::callback_handler(bot, q, db).await }
                }),
            )
            .branch(
                Update::filter_message().endpoint(move |msg: Message| {
                    let db = text_db.clone();
                    let engine = text_engine.clone();
                    let outbox = text_outbox.clone();
                    async move { text::text_handler(msg, db, engine, outbox).await }
                }),
            )
    }
}
