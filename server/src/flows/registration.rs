use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::views::{open_lot_options, registered_in, LotOption};
use crate::models::{Lot, Participant, ParticipantStatus};
use crate::storage::Storage;
use crate::utils::error::AppError;
use crate::utils::ids::IdGenerator;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ticket_type: String,
    pub lot_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOptions {
    pub lots: Vec<LotOption>,
    pub ticket_types: Vec<String>,
}

/// A stored registration plus where to continue to pay.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub participant: Participant,
    pub payment_url: String,
}

#[derive(Default)]
struct Collections {
    lots: Vec<Lot>,
    participants: Vec<Participant>,
}

pub struct RegistrationFlow {
    storage: Storage,
    ids: Arc<IdGenerator>,
    ticket_types: Vec<String>,
    payment_url: String,
    state: Mutex<Collections>,
}

impl RegistrationFlow {
    pub async fn init(
        storage: Storage,
        ids: Arc<IdGenerator>,
        ticket_types: Vec<String>,
        payment_url: String,
    ) -> Self {
        let flow = Self {
            storage,
            ids,
            ticket_types,
            payment_url,
            state: Mutex::new(Collections::default()),
        };
        {
            let mut state = flow.state.lock().await;
            flow.refresh(&mut state).await;
        }
        flow
    }

    pub fn payment_url(&self) -> &str {
        &self.payment_url
    }

    /// Reloads the form's collections, as opening the page does.
    async fn refresh(&self, state: &mut Collections) {
        state.lots = self.storage.load_lots().await;
        state.participants = self.storage.load_participants().await;
    }

    pub async fn options(&self) -> RegistrationOptions {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        RegistrationOptions {
            lots: open_lot_options(&state.lots),
            ticket_types: self.ticket_types.clone(),
        }
    }

    /// Appends a pending participant and persists the collection. Each call
    /// appends, so repeated submits create repeated registrations.
    pub async fn register(&self, form: RegistrationForm) -> Result<Registration, AppError> {
        let name = form.name.trim();
        let email = form.email.trim();
        let phone = form.phone.trim();
        if name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(AppError::ValidationError(
                "name, email and phone are required".to_string(),
            ));
        }
        if !self.ticket_types.iter().any(|t| *t == form.ticket_type) {
            return Err(AppError::ValidationError(format!(
                "unknown ticket type '{}'",
                form.ticket_type
            )));
        }

        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;

        let lot = state
            .lots
            .iter()
            .find(|lot| lot.id == form.lot_id && lot.is_open())
            .ok_or_else(|| {
                AppError::ValidationError(format!("lot {} is not open for registration", form.lot_id))
            })?;
        let taken = registered_in(&state.participants, lot.id);
        if taken >= lot.limit as usize {
            return Err(AppError::Conflict(format!("{} is sold out", lot.name)));
        }

        let participant = Participant {
            id: self.ids.next_id(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            ticket_type: form.ticket_type,
            lot_id: form.lot_id,
            status: ParticipantStatus::Pending,
        };
        state.participants.push(participant.clone());

        if let Err(e) = self.storage.save(&state.participants).await {
            warn!(participant_id = participant.id, error = %e, "Registration kept in memory only");
        }
        info!(participant_id = participant.id, lot_id = participant.lot_id, "Participant registered");

        Ok(Registration {
            participant,
            payment_url: self.payment_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LotStatus;
    use crate::storage::LocalStore;
    use rstest::rstest;
    use std::collections::HashSet;

    async fn flow(dir: &tempfile::TempDir) -> (RegistrationFlow, Storage) {
        let storage = Storage::new(Arc::new(LocalStore::new(dir.path())));
        let flow = RegistrationFlow::init(
            storage.clone(),
            Arc::new(IdGenerator::new()),
            vec!["Inteira".to_string(), "Meia".to_string()],
            "payment.html".to_string(),
        )
        .await;
        (flow, storage)
    }

    fn form(lot_id: i64, ticket_type: &str) -> RegistrationForm {
        RegistrationForm {
            name: "  Ana Silva ".to_string(),
            email: "ana@x.com".to_string(),
            phone: "11 98888-7777".to_string(),
            ticket_type: ticket_type.to_string(),
            lot_id,
        }
    }

    #[tokio::test]
    async fn test_options_list_open_lots_and_ticket_types() {
        let dir = tempfile::tempdir().unwrap();
        let (flow, _) = flow(&dir).await;

        let options = flow.options().await;
        assert_eq!(options.lots.len(), 1);
        assert_eq!(options.lots[0].id, 1);
        assert_eq!(options.lots[0].label, "Lote 1 — R$ 0.00");
        assert_eq!(options.ticket_types, vec!["Inteira", "Meia"]);
    }

    #[tokio::test]
    async fn test_register_stores_pending_participant() {
        let dir = tempfile::tempdir().unwrap();
        let (flow, storage) = flow(&dir).await;

        let registration = flow.register(form(1, "Meia")).await.unwrap();
        assert_eq!(registration.payment_url, "payment.html");

        let stored = storage.load_participants().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], registration.participant);
        assert_eq!(stored[0].lot_id, 1);
        assert_eq!(stored[0].ticket_type, "Meia");
        assert_eq!(stored[0].status, ParticipantStatus::Pending);
        assert_eq!(stored[0].name, "Ana Silva");
    }

    #[tokio::test]
    async fn test_each_submit_appends_with_unique_id() {
        let dir = tempfile::tempdir().unwrap();
        let (flow, storage) = flow(&dir).await;

        for _ in 0..3 {
            flow.register(form(1, "Inteira")).await.unwrap();
        }

        let stored = storage.load_participants().await;
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.iter().map(|p| p.id).collect::<HashSet<_>>().len(), 3);
    }

    #[rstest]
    #[case::closed_lot(form(2, "Meia"))]
    #[case::missing_lot(form(99, "Meia"))]
    #[case::unknown_ticket(form(1, "VIP"))]
    #[case::blank_email(RegistrationForm { email: "  ".to_string(), ..form(1, "Meia") })]
    #[tokio::test]
    async fn test_invalid_forms_append_nothing(#[case] invalid: RegistrationForm) {
        let dir = tempfile::tempdir().unwrap();
        let (flow, storage) = flow(&dir).await;

        let err = flow.register(invalid).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(storage.load_participants().await.is_empty());
    }

    #[tokio::test]
    async fn test_full_lot_rejects_registration() {
        let dir = tempfile::tempdir().unwrap();
        let (flow, storage) = flow(&dir).await;
        let mut lots = storage.load_lots().await;
        lots[0].limit = 1;
        lots[0].status = LotStatus::Open;
        storage.save(&lots).await.unwrap();

        flow.register(form(1, "Meia")).await.unwrap();
        let err = flow.register(form(1, "Meia")).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(storage.load_participants().await.len(), 1);
    }
}
