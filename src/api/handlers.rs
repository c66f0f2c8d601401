/// Axum handlers for the transfer page
///
/// Form posts update the session and redirect back to the page, which then
/// shows the outcome. The JSON endpoint exposes the same state for scripts.
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};

use super::page;
use super::types::{SelectAccountRequest, StateResponse, TransferRequestForm};
use crate::error::TransferError;
use crate::session::TransferSession;

/// Handler error
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        log::warn!("{} {}", status, message);
        (status, message).into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        let message = err.to_string();
        match err {
            TransferError::Validation(_) => ApiError::BadRequest(message),
            TransferError::UnknownAccount(_) => ApiError::NotFound(message),
            TransferError::Busy | TransferError::NothingToCancel => ApiError::Conflict(message),
            TransferError::NotReady => ApiError::Unavailable(message),
        }
    }
}

/// GET /
pub async fn page_handler(State(session): State<TransferSession>) -> Html<String> {
    Html(page::render(&session.snapshot().await))
}

/// POST /account
pub async fn select_account_handler(
    State(session): State<TransferSession>,
    Form(req): Form<SelectAccountRequest>,
) -> Result<Redirect, ApiError> {
    session.select_account(&req.address).await?;
    Ok(Redirect::to("/"))
}

/// POST /transfer
/// Stores the entered values and starts the submission. Validation failures
/// are shown on the page rather than returned as an error status.
pub async fn transfer_handler(
    State(session): State<TransferSession>,
    Form(req): Form<TransferRequestForm>,
) -> Result<Redirect, ApiError> {
    session.set_recipient(&req.recipient).await?;
    session.set_amount(&req.amount).await?;

    match session.submit().await {
        Ok(()) | Err(TransferError::Validation(_)) => Ok(Redirect::to("/")),
        Err(e) => Err(e.into()),
    }
}

/// POST /cancel
pub async fn cancel_handler(State(session): State<TransferSession>) -> Result<Redirect, ApiError> {
    session.cancel().await?;
    Ok(Redirect::to("/"))
}

/// GET /api/state
pub async fn state_handler(State(session): State<TransferSession>) -> Json<StateResponse> {
    Json(StateResponse::from(&session.snapshot().await))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
