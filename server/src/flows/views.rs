//! View models computed from the in-memory collections. Views never mutate
//! the collections they are derived from.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Lot, LotStatus, Participant, ParticipantStatus};

/// A selectable lot in the registration form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotOption {
    pub id: i64,
    pub label: String,
}

impl LotOption {
    pub fn from_lot(lot: &Lot) -> Self {
        Self {
            id: lot.id,
            label: format!("{} — R$ {:.2}", lot.name, lot.price),
        }
    }
}

/// Editable lot card in the admin console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotCard {
    pub index: usize,
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub limit: u32,
    pub status: LotStatus,
    pub registered: usize,
    pub deletable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ticket_type: String,
    pub lot_name: String,
    pub status: ParticipantStatus,
    pub can_check_in: bool,
    /// The referenced lot no longer exists.
    pub orphaned: bool,
}

pub fn open_lot_options(lots: &[Lot]) -> Vec<LotOption> {
    lots.iter()
        .filter(|lot| lot.is_open())
        .map(LotOption::from_lot)
        .collect()
}

pub fn registered_in(participants: &[Participant], lot_id: i64) -> usize {
    participants.iter().filter(|p| p.lot_id == lot_id).count()
}

pub fn lot_cards(lots: &[Lot], participants: &[Participant]) -> Vec<LotCard> {
    let deletable = lots.len() > 1;
    lots.iter()
        .enumerate()
        .map(|(index, lot)| LotCard {
            index,
            id: lot.id,
            name: lot.name.clone(),
            price: lot.price,
            limit: lot.limit,
            status: lot.status,
            registered: registered_in(participants, lot.id),
            deletable,
        })
        .collect()
}

pub fn participant_row(participant: &Participant, lots: &[Lot]) -> ParticipantRow {
    let lot = lots.iter().find(|l| l.id == participant.lot_id);
    ParticipantRow {
        id: participant.id,
        name: participant.name.clone(),
        email: participant.email.clone(),
        phone: participant.phone.clone(),
        ticket_type: participant.ticket_type.clone(),
        lot_name: lot.map(|l| l.name.clone()).unwrap_or_default(),
        status: participant.status,
        can_check_in: !participant.is_present(),
        orphaned: lot.is_none(),
    }
}

/// Participants with the given status, in collection order. `None` keeps all.
pub fn filter_by_status(
    participants: &[Participant],
    status: Option<ParticipantStatus>,
) -> Vec<&Participant> {
    participants
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect()
}

/// Case-insensitive name/email search; a blank query matches everyone.
pub fn search<'a>(participants: &'a [Participant], query: &str) -> Vec<&'a Participant> {
    let needle = query.trim().to_lowercase();
    participants.iter().filter(|p| p.matches(&needle)).collect()
}
