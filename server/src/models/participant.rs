use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ticket types offered when no override is configured.
pub const DEFAULT_TICKET_TYPES: [&str; 2] = ["Inteira", "Meia"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Pending,
    Present,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Present => "present",
        }
    }
}

impl FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ParticipantStatus::Pending),
            "present" => Ok(ParticipantStatus::Present),
            other => Err(format!("unknown participant status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ticket_type: String,
    pub lot_id: i64,
    pub status: ParticipantStatus,
}

impl Participant {
    pub fn is_present(&self) -> bool {
        self.status == ParticipantStatus::Present
    }

    /// Marks the participant as present. Returns `false` when they already were.
    pub fn check_in(&mut self) -> bool {
        let changed = !self.is_present();
        self.status = ParticipantStatus::Present;
        changed
    }

    /// Case-insensitive substring match against name or email.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}
