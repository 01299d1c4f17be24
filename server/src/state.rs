use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{Config, Page};
use crate::flows::{AdminConsole, CheckinKiosk, RegistrationFlow};
use crate::storage::{Backend, LocalStore, RemoteStore, Storage};
use crate::utils::ids::IdGenerator;

/// Flows initialized for the configured pages.
#[derive(Clone, Default)]
pub struct AppState {
    pub registration: Option<Arc<RegistrationFlow>>,
    pub admin: Option<Arc<AdminConsole>>,
    pub checkin: Option<Arc<CheckinKiosk>>,
}

/// Picks the remote backend when it is fully configured and its client can
/// be built, local storage otherwise.
pub fn select_backend(config: &Config) -> Arc<dyn Backend> {
    if let Some(remote) = &config.remote {
        match RemoteStore::new(&remote.url, remote.access_key.clone(), config.remote_timeout) {
            Ok(store) => {
                info!(url = %remote.url, "Storage: using remote tables");
                return Arc::new(store);
            }
            Err(e) => {
                warn!(error = %e, "Storage: remote client unavailable, falling back to local");
            }
        }
    }

    let store = LocalStore::new(&config.data_dir);
    info!(dir = %store.dir().display(), "Storage: using local entries");
    Arc::new(store)
}

impl AppState {
    pub async fn init(config: &Config, storage: Storage) -> Self {
        let ids = Arc::new(IdGenerator::new());
        let mut state = Self::default();

        if config.serves(Page::Registration) {
            let flow = RegistrationFlow::init(
                storage.clone(),
                ids.clone(),
                config.ticket_types.clone(),
                config.payment_url.clone(),
            )
            .await;
            state.registration = Some(Arc::new(flow));
            info!("Registration flow initialized");
        }
        if config.serves(Page::Admin) {
            state.admin = Some(Arc::new(AdminConsole::init(storage.clone(), ids.clone()).await));
            info!("Admin console initialized");
        }
        if config.serves(Page::Checkin) {
            state.checkin = Some(Arc::new(
                CheckinKiosk::init(storage, config.checkin_notice).await,
            ));
            info!("Check-in kiosk initialized");
        }

        state
    }
}
