use tokio::sync::mpsc;

/// A domain change emitted by whoever mutated program data. Persistence and
/// delivery are decoupled: emitters never talk to Telegram, the dispatcher
/// task owns all fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramEvent {
    EventCreated {
        event_id: i64,
    },
    ProgramChanged {
        event_id: i64,
        description: String,
    },
    ReminderDue {
        event_id: i64,
        speech_id: Option<i64>,
    },
}

pub type ProgramEventSender = mpsc::UnboundedSender<ProgramEvent>;
pub type ProgramEventReceiver = mpsc::UnboundedReceiver<ProgramEvent>;

pub fn channel() -> (ProgramEventSender, ProgramEventReceiver) {
    mpsc::unbounded_channel()
}
