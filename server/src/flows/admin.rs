use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::views::{filter_by_status, lot_cards, participant_row, LotCard, ParticipantRow};
use crate::models::{Lot, LotStatus, Participant, ParticipantStatus};
use crate::storage::{Record, Storage};
use crate::utils::error::AppError;
use crate::utils::ids::IdGenerator;

/// Field values submitted from a lot card.
#[derive(Debug, Clone, Deserialize)]
pub struct LotEdit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub limit: u32,
    pub status: LotStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantEdit {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Both admin tables after a mutation that touches them.
#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub lots: Vec<LotCard>,
    pub participants: Vec<ParticipantRow>,
}

/// The console's working copy. A collection whose last save failed stays
/// authoritative and is not replaced by a refresh until it saves again.
#[derive(Default)]
struct Collections {
    lots: Vec<Lot>,
    participants: Vec<Participant>,
    unsaved_lots: bool,
    unsaved_participants: bool,
}

impl Collections {
    fn participant_index(&self, id: i64) -> Result<usize, AppError> {
        self.participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("participant {} was not found", id)))
    }

    fn lot_at(&mut self, index: usize) -> Result<&mut Lot, AppError> {
        self.lots
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("no lot at position {}", index)))
    }

    fn rows(&self, status: Option<ParticipantStatus>) -> Vec<ParticipantRow> {
        filter_by_status(&self.participants, status)
            .into_iter()
            .map(|p| participant_row(p, &self.lots))
            .collect()
    }

    fn view(&self) -> AdminView {
        AdminView {
            lots: lot_cards(&self.lots, &self.participants),
            participants: self.rows(None),
        }
    }
}

fn require_confirmation(confirmed: bool, action: &str) -> Result<(), AppError> {
    if confirmed {
        Ok(())
    } else {
        Err(AppError::Conflict(format!("{} requires confirmation", action)))
    }
}

/// Admin console holding its own copy of both collections. Every request
/// starts from what storage holds, as opening the page does, so changes
/// made by other flows are never saved over.
pub struct AdminConsole {
    storage: Storage,
    ids: Arc<IdGenerator>,
    state: Mutex<Collections>,
}

impl AdminConsole {
    pub async fn init(storage: Storage, ids: Arc<IdGenerator>) -> Self {
        let console = Self {
            storage,
            ids,
            state: Mutex::new(Collections::default()),
        };
        console.reload().await;
        console
    }

    /// Re-fetches both collections, dropping any unsaved working copy.
    pub async fn reload(&self) -> AdminView {
        let mut state = self.state.lock().await;
        state.unsaved_lots = false;
        state.unsaved_participants = false;
        self.refresh(&mut state).await;
        state.view()
    }

    async fn refresh(&self, state: &mut Collections) {
        if !state.unsaved_lots {
            state.lots = self.storage.load_lots().await;
        }
        self.refresh_participants(state).await;
    }

    async fn refresh_participants(&self, state: &mut Collections) {
        if !state.unsaved_participants {
            state.participants = self.storage.load_participants().await;
        }
    }

    /// Returns whether the save went through.
    async fn persist<T: Record>(&self, records: &[T]) -> bool {
        match self.storage.save(records).await {
            Ok(()) => true,
            Err(e) => {
                let collection = T::COLLECTION;
                warn!(%collection, error = %e, "Admin change kept in memory only");
                false
            }
        }
    }

    async fn persist_lots(&self, state: &mut Collections) {
        let saved = self.persist(&state.lots).await;
        state.unsaved_lots = !saved;
    }

    async fn persist_participants(&self, state: &mut Collections) {
        let saved = self.persist(&state.participants).await;
        state.unsaved_participants = !saved;
    }

    async fn delete_remote<T: Record>(&self, record: &T) {
        // Local storage deletes by omission on the next save.
        if let Err(e) = self.storage.delete(record).await {
            let collection = T::COLLECTION;
            warn!(%collection, id = record.id(), error = %e, "Targeted delete failed");
        }
    }

    pub async fn lots(&self) -> Vec<LotCard> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        lot_cards(&state.lots, &state.participants)
    }

    pub async fn participants(&self, status: Option<ParticipantStatus>) -> Vec<ParticipantRow> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        state.rows(status)
    }

    pub async fn edit_lot(&self, index: usize, edit: LotEdit) -> Result<Lot, AppError> {
        if edit.price.is_sign_negative() {
            return Err(AppError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }
        let name = match edit.name.as_deref().map(str::trim) {
            Some("") => {
                return Err(AppError::ValidationError(
                    "lot name must not be blank".to_string(),
                ))
            }
            other => other.map(str::to_string),
        };

        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        let lot = state.lot_at(index)?;
        if let Some(name) = name {
            lot.name = name;
        }
        lot.price = edit.price;
        lot.limit = edit.limit;
        lot.status = edit.status;
        let saved = lot.clone();

        self.persist_lots(&mut state).await;
        info!(lot_id = saved.id, index, "Lot saved");
        Ok(saved)
    }

    /// Appends a closed lot named after its position.
    pub async fn add_lot(&self) -> Vec<LotCard> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        let lot = Lot {
            id: self.ids.next_id(),
            name: format!("Lote {}", state.lots.len() + 1),
            price: Decimal::ZERO,
            limit: 0,
            status: LotStatus::Closed,
        };
        info!(lot_id = lot.id, "Lot added");
        state.lots.push(lot);

        self.persist_lots(&mut state).await;
        lot_cards(&state.lots, &state.participants)
    }

    /// Deletes the lot at `index`, then reloads participants so rows pick up
    /// whatever the backend did to them. Participants of the deleted lot are
    /// kept and reported as orphaned.
    pub async fn delete_lot(&self, index: usize, confirmed: bool) -> Result<AdminView, AppError> {
        require_confirmation(confirmed, "deleting a lot")?;

        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        if state.lots.len() <= 1 {
            return Err(AppError::Conflict(
                "the last remaining lot cannot be deleted".to_string(),
            ));
        }
        state.lot_at(index)?;
        let removed = state.lots.remove(index);

        self.delete_remote(&removed).await;
        self.persist_lots(&mut state).await;
        info!(lot_id = removed.id, "Lot deleted");

        self.refresh_participants(&mut state).await;
        let orphaned = state
            .participants
            .iter()
            .filter(|p| p.lot_id == removed.id)
            .count();
        if orphaned > 0 {
            warn!(lot_id = removed.id, orphaned, "Participants reference a deleted lot");
        }

        Ok(state.view())
    }

    pub async fn delete_participant(&self, id: i64, confirmed: bool) -> Result<(), AppError> {
        require_confirmation(confirmed, "deleting a participant")?;

        let mut state = self.state.lock().await;
        self.refresh_participants(&mut state).await;
        let index = state.participant_index(id)?;
        let removed = state.participants.remove(index);

        self.delete_remote(&removed).await;
        self.persist_participants(&mut state).await;
        info!(participant_id = id, "Participant deleted");
        Ok(())
    }

    pub async fn check_in(&self, id: i64) -> Result<ParticipantRow, AppError> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        let index = state.participant_index(id)?;
        if state.participants[index].check_in() {
            info!(participant_id = id, "Participant checked in");
        }

        self.persist_participants(&mut state).await;
        Ok(participant_row(&state.participants[index], &state.lots))
    }

    /// Replaces contact details; every field must be non-blank after trimming.
    pub async fn edit_participant(
        &self,
        id: i64,
        edit: ParticipantEdit,
    ) -> Result<ParticipantRow, AppError> {
        let name = edit.name.trim();
        let email = edit.email.trim();
        let phone = edit.phone.trim();
        if name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(AppError::ValidationError(
                "name, email and phone are required".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        let index = state.participant_index(id)?;
        let participant = &mut state.participants[index];
        participant.name = name.to_string();
        participant.email = email.to_string();
        participant.phone = phone.to_string();

        self.persist_participants(&mut state).await;
        Ok(participant_row(&state.participants[index], &state.lots))
    }
}
