pub mod admin;
pub mod events;
pub mod health;
pub mod notifier;
pub mod outbox;
pub mod reminder;
