use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// Main menu button labels. The text router matches on these verbatim.
pub mod buttons {
    pub const ASK_QUESTION: &str = "Вопрос спикеру";
    pub const PROGRAM: &str = "Программа";
    pub const NETWORKING: &str = "Нетворкинг";
    pub const DONATE: &str = "Поддержать митап";
    pub const MY_QUESTIONS: &str = "Мои вопросы";
}

pub fn main_menu(is_speaker: bool) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = if is_speaker {
        vec![
            vec![
                KeyboardButton::new(buttons::ASK_QUESTION),
                KeyboardButton::new(buttons::PROGRAM),
            ],
            vec![
                KeyboardButton::new(buttons::NETWORKING),
                KeyboardButton::new(buttons::MY_QUESTIONS),
            ],
            vec![KeyboardButton::new(buttons::DONATE)],
        ]
    } else {
        vec![
            vec![
                KeyboardButton::new(buttons::ASK_QUESTION),
                KeyboardButton::new(buttons::PROGRAM),
            ],
            vec![
                KeyboardButton::new(buttons::NETWORKING),
                KeyboardButton::new(buttons::DONATE),
            ],
        ]
    };

    KeyboardMarkup::new(rows).resize_keyboard(true)
}
