use std::{fmt, str::FromStr};

use super::{parse_field, split_fields};
use crate::{Error, Record, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Login,
    Logout,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Login => write!(f, "Login"),
            EventKind::Logout => write!(f, "Logout"),
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            other => Err(Error::Parse(format!("unknown event type {}", other))),
        }
    }
}

/// One login or logout, as kept in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u32,
    pub user_id: UserId,
    pub kind: EventKind,
    pub timestamp: Timestamp,
}

impl Record for Event {
    fn to_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.seq, self.user_id, self.kind, self.timestamp
        )
    }

    fn from_line(line: &str) -> Result<Self, Error> {
        let f = split_fields(line, 4)?;
        Ok(Self {
            seq: parse_field(line, f[0])?,
            user_id: f[1].to_string(),
            kind: f[2].parse()?,
            timestamp: f[3].parse()?,
        })
    }
}
