//! REST surface for the onboarding wizard.
//!
//! Every response carries no-cache headers: the wizard is a single-session,
//! in-memory flow, and a cached response would resurrect stale state the
//! server no longer holds.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, EXPIRES, HeaderValue, PRAGMA};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use uuid::Uuid;

use crate::error::{Error, SessionError, WizardError};
use crate::session::SessionRegistry;
use crate::wizard::manager::{WizardManager, WizardSnapshot};
use crate::wizard::model::AccountDraft;
use crate::wizard::state::WizardStep;
use crate::wizard::verify::Channel;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<SessionRegistry>,
}

/// Build the wizard REST routes with the no-cache policy applied.
pub fn wizard_routes(registry: Arc<SessionRegistry>) -> Router {
    let state = ApiState { registry };

    Router::new()
        .route("/health", get(health))
        .route("/api/wizard", post(create_session))
        .route("/api/wizard/{id}", get(get_snapshot))
        .route("/api/wizard/{id}", delete(remove_session))
        .route("/api/wizard/{id}/intent", post(submit_intent))
        .route("/api/wizard/{id}/step", post(goto_step))
        .route("/api/wizard/{id}/tools", put(set_tools))
        .route("/api/wizard/{id}/tools/add", post(add_tool))
        .route("/api/wizard/{id}/answers", put(set_answer))
        .route("/api/wizard/{id}/account", put(update_account))
        .route("/api/wizard/{id}/verify/{channel}/send", post(send_code))
        .route("/api/wizard/{id}/verify/{channel}/digit", post(input_digit))
        .route(
            "/api/wizard/{id}/verify/{channel}/backspace",
            post(backspace_digit),
        )
        .route("/api/wizard/{id}/verify/{channel}/paste", post(paste_code))
        .route("/api/wizard/{id}/submit", post(submit_account))
        .route(
            "/api/wizard/{id}/integrations/connect",
            post(connect_integration),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            EXPIRES,
            HeaderValue::from_static("0"),
        ))
}

// ── Error mapping ───────────────────────────────────────────────────────

/// Handler-level error: maps domain errors onto HTTP statuses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(Error::Session(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Session(SessionError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Wizard(
                WizardError::InvalidTransition { .. } | WizardError::WrongStep { .. },
            ) => StatusCode::CONFLICT,
            Error::Wizard(
                WizardError::CellOutOfRange { .. } | WizardError::UnknownIntegration { .. },
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

async fn session(state: &ApiState, id: Uuid) -> ApiResult<Arc<WizardManager>> {
    Ok(state.registry.get(id).await?)
}

async fn snapshot_of(manager: &WizardManager) -> Json<WizardSnapshot> {
    Json(manager.snapshot().await)
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(serde::Serialize)]
struct CreatedSession {
    session_id: Uuid,
}

async fn create_session(State(state): State<ApiState>) -> impl IntoResponse {
    let session_id = state.registry.create().await;
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

async fn get_snapshot(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    Ok(snapshot_of(&manager).await)
}

async fn remove_session(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.registry.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SessionError::NotFound { id }.into())
    }
}

#[derive(Deserialize)]
struct IntentBody {
    text: String,
}

async fn submit_intent(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<IntentBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.submit_intent(&body.text).await;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct StepBody {
    step: WizardStep,
}

async fn goto_step(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StepBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.goto(body.step).await?;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct ToolsBody {
    tools: Vec<String>,
}

async fn set_tools(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ToolsBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.set_tools(body.tools).await;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct ToolBody {
    name: String,
}

async fn add_tool(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ToolBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.add_tool(&body.name).await?;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct AnswerBody {
    id: String,
    value: String,
}

async fn set_answer(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnswerBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.set_answer(&body.id, &body.value).await;
    Ok(snapshot_of(&manager).await)
}

async fn update_account(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<AccountDraft>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.update_account(draft).await;
    Ok(snapshot_of(&manager).await)
}

async fn send_code(
    State(state): State<ApiState>,
    Path((id, channel)): Path<(Uuid, Channel)>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.send_code(channel).await;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct DigitBody {
    index: usize,
    /// A single digit, or null/absent to clear the cell.
    #[serde(default)]
    value: Option<char>,
}

async fn input_digit(
    State(state): State<ApiState>,
    Path((id, channel)): Path<(Uuid, Channel)>,
    Json(body): Json<DigitBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.input_digit(channel, body.index, body.value).await?;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct BackspaceBody {
    index: usize,
}

async fn backspace_digit(
    State(state): State<ApiState>,
    Path((id, channel)): Path<(Uuid, Channel)>,
    Json(body): Json<BackspaceBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.backspace_digit(channel, body.index).await?;
    Ok(snapshot_of(&manager).await)
}

#[derive(Deserialize)]
struct PasteBody {
    text: String,
}

async fn paste_code(
    State(state): State<ApiState>,
    Path((id, channel)): Path<(Uuid, Channel)>,
    Json(body): Json<PasteBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.paste_code(channel, &body.text).await;
    Ok(snapshot_of(&manager).await)
}

async fn submit_account(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let manager = session(&state, id).await?;
    let errors = manager.submit_account().await?;
    if errors.is_empty() {
        Ok(snapshot_of(&manager).await.into_response())
    } else {
        Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response())
    }
}

async fn connect_integration(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ToolBody>,
) -> ApiResult<Json<WizardSnapshot>> {
    let manager = session(&state, id).await?;
    manager.connect_integration(&body.name).await?;
    Ok(snapshot_of(&manager).await)
}
