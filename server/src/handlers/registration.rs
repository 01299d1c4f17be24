use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use crate::flows::registration::RegistrationForm;
use crate::flows::RegistrationFlow;
use crate::utils::error::AppError;
use crate::utils::response::{created, data};

pub async fn options(State(flow): State<Arc<RegistrationFlow>>) -> Response {
    data(flow.options().await)
}

pub async fn register(
    State(flow): State<Arc<RegistrationFlow>>,
    Json(form): Json<RegistrationForm>,
) -> Result<Response, AppError> {
    let registration = flow.register(form).await?;
    Ok(created(registration, "Registration received"))
}

/// Payment handoff; no payment is processed here.
pub async fn payment(State(flow): State<Arc<RegistrationFlow>>) -> Response {
    Redirect::to(flow.payment_url()).into_response()
}
