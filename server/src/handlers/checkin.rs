use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::flows::CheckinKiosk;
use crate::utils::error::AppError;
use crate::utils::response::{data, success};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Opening the kiosk page: refreshes from storage.
pub async fn open(
    State(kiosk): State<Arc<CheckinKiosk>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    data(kiosk.view(&query.q).await)
}

pub async fn search(
    State(kiosk): State<Arc<CheckinKiosk>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    data(kiosk.search(&query.q).await)
}

pub async fn check_in(
    State(kiosk): State<Arc<CheckinKiosk>>,
    Path(id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let view = kiosk.check_in(id, &query.q).await?;
    Ok(success(view, "Participant checked in"))
}

pub async fn reload(State(kiosk): State<Arc<CheckinKiosk>>) -> Response {
    success(kiosk.reload().await, "Participants reloaded")
}
