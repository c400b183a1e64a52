pub mod program;
pub mod questions;
pub mod subscriptions;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "Команды бота:")]
pub enum Command {
    #[command(description = "описание и главное меню")]
    Start,
    #[command(description = "помощь")]
    Help,
    #[command(description = "обновить меню")]
    Update,
    #[command(description = "для спикеров: посмотреть вопросы")]
    MyQuestions,
    #[command(description = "подписаться на уведомления")]
    Subscribe,
    #[command(description = "отписаться от уведомлений")]
    Unsubscribe,
    #[command(description = "настройки уведомлений")]
    Settings,
    #[command(description = "программа митапа")]
    Program,
}
