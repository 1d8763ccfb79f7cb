use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// A battle decision, indexed from 1 as the server expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Choice {
    /// `move N`: the Nth move slot of the active pokemon
    Move(usize),
    /// `switch N`: the Nth member of the request's team list
    Switch(usize),
}

impl Choice {
    pub fn is_switch(&self) -> bool {
        matches!(self, Choice::Switch(_))
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Choice::Move(_))
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Move(n) => write!(f, "move {}", n),
            Choice::Switch(n) => write!(f, "switch {}", n),
        }
    }
}

impl FromStr for Choice {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s
            .split_once(' ')
            .ok_or_else(|| ParseError::InvalidFormat(s.to_string()))?;
        let index: usize = index
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidFormat(s.to_string()))?;
        if index == 0 {
            return Err(ParseError::InvalidFormat(s.to_string()));
        }

        match kind {
            "move" => Ok(Choice::Move(index)),
            "switch" => Ok(Choice::Switch(index)),
            _ => Err(ParseError::InvalidFormat(s.to_string())),
        }
    }
}

/// Commands that clients can send to server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// /choose CHOICE|RQID
    Choose { choice: Choice, rqid: Option<u64> },

    /// /forfeit
    Forfeit,

    /// Raw command for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Choose { choice, rqid } => match rqid {
                Some(id) => format!("/choose {}|{}", choice, id),
                None => format!("/choose {}", choice),
            },
            Self::Forfeit => "/forfeit".to_string(),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with optional room context
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    pub room_id: Option<String>,
    pub command: ClientCommand,
}

impl ClientMessage {
    pub fn choose(room_id: impl Into<String>, choice: Choice, rqid: Option<u64>) -> Self {
        Self {
            room_id: Some(room_id.into()),
            command: ClientCommand::Choose { choice, rqid },
        }
    }

    /// Serialize to wire format: ROOMID|TEXT or |TEXT
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.room_id {
            Some(room) => format!("{}|{}", room, text),
            None => format!("|{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_display() {
        assert_eq!(Choice::Move(1).to_string(), "move 1");
        assert_eq!(Choice::Switch(3).to_string(), "switch 3");
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!("move 2".parse::<Choice>().unwrap(), Choice::Move(2));
        assert_eq!("switch 4".parse::<Choice>().unwrap(), Choice::Switch(4));
        assert!("switch 0".parse::<Choice>().is_err());
        assert!("team 1".parse::<Choice>().is_err());
    }

    #[test]
    fn test_choose_wire_format() {
        let msg = ClientMessage::choose("battle-gen4randombattle-1", Choice::Move(1), Some(7));
        assert_eq!(
            msg.to_wire_format(),
            "battle-gen4randombattle-1|/choose move 1|7"
        );
    }
}
