use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::flows::admin::{LotEdit, ParticipantEdit};
use crate::flows::AdminConsole;
use crate::models::ParticipantStatus;
use crate::utils::error::AppError;
use crate::utils::response::{created, data, empty_success, success};

#[derive(Debug, Default, Deserialize)]
pub struct Confirm {
    #[serde(default)]
    pub confirm: bool,
}

/// `status` is optional; an empty value lists everyone.
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub status: String,
}

impl StatusFilter {
    fn parse(&self) -> Result<Option<ParticipantStatus>, AppError> {
        let status = self.status.trim();
        if status.is_empty() {
            return Ok(None);
        }
        status.parse().map(Some).map_err(AppError::ValidationError)
    }
}

pub async fn list_lots(State(console): State<Arc<AdminConsole>>) -> Response {
    data(console.lots().await)
}

pub async fn add_lot(State(console): State<Arc<AdminConsole>>) -> Response {
    created(console.add_lot().await, "Lot added")
}

pub async fn edit_lot(
    State(console): State<Arc<AdminConsole>>,
    Path(index): Path<usize>,
    Json(edit): Json<LotEdit>,
) -> Result<Response, AppError> {
    let lot = console.edit_lot(index, edit).await?;
    Ok(success(lot, "Lot saved"))
}

pub async fn delete_lot(
    State(console): State<Arc<AdminConsole>>,
    Path(index): Path<usize>,
    Query(confirm): Query<Confirm>,
) -> Result<Response, AppError> {
    let view = console.delete_lot(index, confirm.confirm).await?;
    Ok(success(view, "Lot deleted"))
}

pub async fn list_participants(
    State(console): State<Arc<AdminConsole>>,
    Query(filter): Query<StatusFilter>,
) -> Result<Response, AppError> {
    let status = filter.parse()?;
    Ok(data(console.participants(status).await))
}

pub async fn edit_participant(
    State(console): State<Arc<AdminConsole>>,
    Path(id): Path<i64>,
    Json(edit): Json<ParticipantEdit>,
) -> Result<Response, AppError> {
    let row = console.edit_participant(id, edit).await?;
    Ok(success(row, "Participant updated"))
}

pub async fn delete_participant(
    State(console): State<Arc<AdminConsole>>,
    Path(id): Path<i64>,
    Query(confirm): Query<Confirm>,
) -> Result<Response, AppError> {
    console.delete_participant(id, confirm.confirm).await?;
    Ok(empty_success("Participant deleted"))
}

pub async fn check_in(
    State(console): State<Arc<AdminConsole>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let row = console.check_in(id).await?;
    Ok(success(row, "Participant checked in"))
}

pub async fn reload(State(console): State<Arc<AdminConsole>>) -> Response {
    success(console.reload().await, "Collections reloaded")
}
