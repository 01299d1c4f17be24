use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use super::views::search;
use crate::models::{Participant, ParticipantStatus};
use crate::storage::Storage;
use crate::utils::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KioskRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ParticipantStatus,
    pub can_check_in: bool,
}

impl From<&Participant> for KioskRow {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            status: p.status,
            can_check_in: !p.is_present(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KioskView {
    pub rows: Vec<KioskRow>,
    /// Confirmation of the latest check-in while it is still showing.
    pub notice: Option<String>,
}

struct Notice {
    text: String,
    expires_at: Instant,
}

#[derive(Default)]
struct KioskState {
    participants: Vec<Participant>,
    /// The last save failed; the in-memory list stays authoritative.
    unsaved: bool,
    notice: Option<Notice>,
}

impl KioskState {
    fn visible_notice(&self) -> Option<String> {
        self.notice
            .as_ref()
            .filter(|n| Instant::now() < n.expires_at)
            .map(|n| n.text.clone())
    }

    fn view(&self, query: &str) -> KioskView {
        KioskView {
            rows: search(&self.participants, query)
                .into_iter()
                .map(KioskRow::from)
                .collect(),
            notice: self.visible_notice(),
        }
    }
}

/// Door check-in station. Opening the page and checking someone in start
/// from storage; typing into the search box filters the list already loaded.
pub struct CheckinKiosk {
    storage: Storage,
    notice_ttl: Duration,
    state: Mutex<KioskState>,
}

impl CheckinKiosk {
    pub async fn init(storage: Storage, notice_ttl: Duration) -> Self {
        let participants = storage.load_participants().await;
        info!(count = participants.len(), "Check-in kiosk loaded participants");
        Self {
            storage,
            notice_ttl,
            state: Mutex::new(KioskState {
                participants,
                ..KioskState::default()
            }),
        }
    }

    async fn refresh(&self, state: &mut KioskState) {
        if !state.unsaved {
            state.participants = self.storage.load_participants().await;
        }
    }

    /// Re-fetches participants, dropping any unsaved check-ins.
    pub async fn reload(&self) -> KioskView {
        let mut state = self.state.lock().await;
        state.unsaved = false;
        self.refresh(&mut state).await;
        state.view("")
    }

    /// Page load: refreshes from storage, then filters by `query`.
    pub async fn view(&self, query: &str) -> KioskView {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        state.view(query)
    }

    /// Filters the last loaded list without touching storage.
    pub async fn search(&self, query: &str) -> KioskView {
        self.state.lock().await.view(query)
    }

    /// Marks the participant present and shows a notice for the configured
    /// delay. The returned view is filtered by `query`.
    pub async fn check_in(&self, id: i64, query: &str) -> Result<KioskView, AppError> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        let participant = state
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("participant {} was not found", id)))?;
        participant.check_in();
        let text = format!("{} marked as present.", participant.name);

        match self.storage.save(&state.participants).await {
            Ok(()) => state.unsaved = false,
            Err(e) => {
                warn!(participant_id = id, error = %e, "Check-in kept in memory only");
                state.unsaved = true;
            }
        }
        info!(participant_id = id, "Participant checked in at kiosk");

        state.notice = Some(Notice {
            text,
            expires_at: Instant::now() + self.notice_ttl,
        });
        Ok(state.view(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::RecordingBackend;
    use crate::storage::{Collection, LocalStore};
    use std::sync::Arc;

    fn participant(id: i64, name: &str, email: &str) -> Participant {
        Participant {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: "0".to_string(),
            ticket_type: "Meia".to_string(),
            lot_id: 1,
            status: ParticipantStatus::Pending,
        }
    }

    async fn kiosk(dir: &tempfile::TempDir) -> (CheckinKiosk, Storage) {
        let storage = Storage::new(Arc::new(LocalStore::new(dir.path())));
        storage
            .save(&[
                participant(1, "Ana Silva", "a@x.com"),
                participant(2, "Bruno", "ana@y.com"),
                participant(3, "Carla", "carla@z.com"),
            ])
            .await
            .unwrap();
        let kiosk = CheckinKiosk::init(storage.clone(), Duration::from_secs(3)).await;
        (kiosk, storage)
    }

    #[tokio::test]
    async fn test_search_matches_name_or_email() {
        let dir = tempfile::tempdir().unwrap();
        let (kiosk, _) = kiosk(&dir).await;

        let view = kiosk.view("ana").await;
        assert_eq!(view.rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(kiosk.view("").await.rows.len(), 3);
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_search_does_not_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let (kiosk, storage) = kiosk(&dir).await;
        storage.save::<Participant>(&[]).await.unwrap();

        assert_eq!(kiosk.search("").await.rows.len(), 3);
        assert!(kiosk.view("").await.rows.is_empty());
        assert!(kiosk.search("").await.rows.is_empty());
    }

    #[tokio::test]
    async fn test_check_in_keeps_registrations_made_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let (kiosk, storage) = kiosk(&dir).await;

        let mut stored = storage.load_participants().await;
        stored.push(participant(4, "Davi", "davi@x.com"));
        storage.save(&stored).await.unwrap();

        let view = kiosk.check_in(1, "").await.unwrap();
        assert_eq!(view.rows.len(), 4);

        let stored = storage.load_participants().await;
        assert_eq!(stored.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(stored[0].status, ParticipantStatus::Present);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_check_in_visible() {
        let backend = Arc::new(RecordingBackend::default());
        let row = serde_json::to_value(participant(1, "Ana Silva", "a@x.com")).unwrap();
        backend.set_rows(Collection::Participants, vec![row]);
        let kiosk = CheckinKiosk::init(Storage::new(backend.clone()), Duration::from_secs(3)).await;
        backend.fail_writes(true);

        kiosk.check_in(1, "").await.unwrap();

        assert_eq!(backend.rows(Collection::Participants)[0]["status"], "pending");
        assert_eq!(kiosk.view("").await.rows[0].status, ParticipantStatus::Present);
        assert_eq!(kiosk.reload().await.rows[0].status, ParticipantStatus::Pending);
    }

    #[tokio::test]
    async fn test_check_in_persists_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (kiosk, storage) = kiosk(&dir).await;

        kiosk.check_in(2, "").await.unwrap();
        let view = kiosk.check_in(2, "bruno").await.unwrap();

        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].status, ParticipantStatus::Present);
        assert!(!view.rows[0].can_check_in);
        let stored = storage.load_participants().await;
        assert_eq!(stored[1].status, ParticipantStatus::Present);
        assert_eq!(stored[0].status, ParticipantStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_participant() {
        let dir = tempfile::tempdir().unwrap();
        let (kiosk, _) = kiosk(&dir).await;

        let err = kiosk.check_in(99, "").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_notice_hides_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(Arc::new(LocalStore::new(dir.path())));
        storage
            .save(&[participant(1, "Ana Silva", "a@x.com")])
            .await
            .unwrap();
        let kiosk = CheckinKiosk::init(storage, Duration::from_millis(200)).await;

        let view = kiosk.check_in(1, "").await.unwrap();
        assert_eq!(view.notice.as_deref(), Some("Ana Silva marked as present."));
        assert!(kiosk.view("").await.notice.is_some());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(kiosk.view("").await.notice.is_none());
    }
}
