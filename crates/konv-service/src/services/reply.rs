//! Transport-agnostic bot replies and button actions.

use std::fmt;
use std::str::FromStr;

use konv_core::ChannelId;

use super::error::ServiceError;

/// Labels of the persistent main menu
pub const MAIN_MENU: [&str; 3] = ["Help", "Channels", "New Channel"];

/// Inline buttons per keyboard row in channel pickers
pub const BUTTONS_PER_ROW: usize = 4;

/// Marker appended to channels already active in the current chat
pub const SUBSCRIBED_MARK: &str = "❌";

/// Action carried by an inline button, encoded as `ACTION/<channel id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Edit(ChannelId),
    Info(ChannelId),
    Activate(ChannelId),
    Delete(ChannelId),
}

impl CallbackAction {
    pub fn channel_id(&self) -> &ChannelId {
        match self {
            Self::Edit(id) | Self::Info(id) | Self::Activate(id) | Self::Delete(id) => id,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Edit(_) => "EDITCHANNEL",
            Self::Info(_) => "INFOCHANNEL",
            Self::Activate(_) => "ACTIVATECHANNEL",
            Self::Delete(_) => "DELETECHANNEL",
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix(), self.channel_id())
    }
}

impl FromStr for CallbackAction {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s
            .split_once('/')
            .ok_or_else(|| ServiceError::validation(format!("malformed action: {s}")))?;
        if id.is_empty() {
            return Err(ServiceError::validation(format!("action without channel: {s}")));
        }
        let id = ChannelId::new(id);
        match prefix {
            "EDITCHANNEL" => Ok(Self::Edit(id)),
            "INFOCHANNEL" => Ok(Self::Info(id)),
            "ACTIVATECHANNEL" => Ok(Self::Activate(id)),
            "DELETECHANNEL" => Ok(Self::Delete(id)),
            other => Err(ServiceError::validation(format!("unknown action: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: CallbackAction,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard; pressing a button sends its label as text
    Menu(Vec<Vec<String>>),
    /// Buttons attached to the message itself
    Inline(Vec<Vec<InlineButton>>),
}

impl Keyboard {
    pub fn main_menu() -> Self {
        Self::Menu(vec![MAIN_MENU.iter().map(ToString::to_string).collect()])
    }

    /// Lay buttons out `BUTTONS_PER_ROW` to a row
    pub fn inline_grid(buttons: Vec<InlineButton>) -> Self {
        Self::Inline(
            buttons
                .chunks(BUTTONS_PER_ROW)
                .map(<[InlineButton]>::to_vec)
                .collect(),
        )
    }
}

/// A message to send back to the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl BotReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_main_menu(self) -> Self {
        self.with_keyboard(Keyboard::main_menu())
    }
}

/// Answer to a button press: a short notice shown to the presser and/or a
/// regular reply in the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackReply {
    pub notice: Option<String>,
    pub reply: Option<BotReply>,
}

impl CallbackReply {
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            notice: Some(text.into()),
            reply: None,
        }
    }

    pub fn reply(reply: BotReply) -> Self {
        Self {
            notice: None,
            reply: Some(reply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_encoding() {
        let action = CallbackAction::Activate(ChannelId::new("9288ec3b"));
        assert_eq!(action.to_string(), "ACTIVATECHANNEL/9288ec3b");
        assert_eq!("ACTIVATECHANNEL/9288ec3b".parse::<CallbackAction>().unwrap(), action);

        assert_eq!(
            "EDITCHANNEL/x".parse::<CallbackAction>().unwrap(),
            CallbackAction::Edit(ChannelId::new("x"))
        );
        assert_eq!(
            "DELETECHANNEL/x".parse::<CallbackAction>().unwrap(),
            CallbackAction::Delete(ChannelId::new("x"))
        );
    }

    #[test]
    fn test_action_rejects_garbage() {
        assert!("EDITCHANNEL".parse::<CallbackAction>().is_err());
        assert!("EDITCHANNEL/".parse::<CallbackAction>().is_err());
        assert!("RENAMECHANNEL/x".parse::<CallbackAction>().is_err());
    }

    #[test]
    fn test_action_fits_callback_data_limit() {
        // Telegram limits callback data to 64 bytes
        let action = CallbackAction::Activate(ChannelId::generate());
        assert!(action.to_string().len() <= 64);
    }

    #[test]
    fn test_inline_grid_rows() {
        let buttons: Vec<_> = (0..6)
            .map(|i| InlineButton::new(format!("ch{i}"), CallbackAction::Edit(ChannelId::new(i.to_string()))))
            .collect();

        let Keyboard::Inline(rows) = Keyboard::inline_grid(buttons) else {
            panic!("expected inline keyboard");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 4);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_main_menu() {
        assert_eq!(
            Keyboard::main_menu(),
            Keyboard::Menu(vec![vec![
                "Help".to_string(),
                "Channels".to_string(),
                "New Channel".to_string()
            ]])
        );
    }
}
