use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    ActorId, InspectionError, InspectionId, InspectionInstance, StepPayload, TripDetails,
    WizardKind,
};
use super::repository::{AuditSink, Authorizer, InspectionStore, StoreError};
use super::service::{InspectionService, ServiceError};
use super::steps::StepProgress;

/// Router builder exposing the inspection workflow over HTTP.
pub fn inspection_router<S, Z, A>(service: Arc<InspectionService<S, Z, A>>) -> Router
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/inspections", post(start_handler::<S, Z, A>))
        .route(
            "/api/v1/inspections/:id",
            get(instance_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/:wizard/steps/:step",
            put(save_step_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/:wizard/progress",
            get(progress_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/submit",
            post(submit_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/approve",
            post(approve_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/reject",
            post(reject_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/scores/pre-trip",
            get(pre_trip_score_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/scores/post-trip",
            get(post_checklist_score_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/scores/final",
            get(final_score_handler::<S, Z, A>),
        )
        .route(
            "/api/v1/inspections/:id/risk",
            get(risk_score_handler::<S, Z, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorRequest {
    pub(crate) actor: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) actor: String,
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveStepRequest {
    pub(crate) actor: String,
    pub(crate) payload: StepPayload,
}

#[derive(Debug, Serialize)]
struct InspectionView {
    id: String,
    code: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    approved_by: Option<String>,
}

impl InspectionView {
    fn from_instance(instance: &InspectionInstance) -> Self {
        Self {
            id: instance.id.0.clone(),
            code: instance.code.clone(),
            status: instance.status.label(),
            rejection_reason: instance.rejection_reason.clone(),
            approved_by: instance.approved_by.as_ref().map(|actor| actor.0.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SavedStepView {
    status: &'static str,
    progress: StepProgress,
}

fn parse_wizard(raw: &str) -> Result<WizardKind, Response> {
    match raw {
        "pre-trip" => Ok(WizardKind::PreTrip),
        "post-trip" => Ok(WizardKind::PostTrip),
        other => Err((
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": format!("unknown wizard '{other}'") })),
        )
            .into_response()),
    }
}

fn error_response(error: ServiceError) -> Response {
    let (status, payload) = match &error {
        ServiceError::Validation(InspectionError::IncompleteSubmission { missing_steps }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": error.to_string(),
                "missing_steps": missing_steps,
            }),
        ),
        ServiceError::Validation(InspectionError::Unauthorized { .. }) => {
            (StatusCode::FORBIDDEN, json!({ "error": error.to_string() }))
        }
        ServiceError::Validation(InspectionError::IllegalTransition { .. })
        | ServiceError::Validation(InspectionError::EditNotAllowed { .. }) => {
            (StatusCode::CONFLICT, json!({ "error": error.to_string() }))
        }
        ServiceError::Validation(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string() }),
        ),
        ServiceError::Store(StoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({ "error": "inspection not found" }),
        ),
        ServiceError::Store(StoreError::Conflict) => {
            (StatusCode::CONFLICT, json!({ "error": error.to_string() }))
        }
        ServiceError::Store(StoreError::Unavailable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
    };
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn start_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    axum::Json(details): axum::Json<TripDetails>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.start(details) {
        Ok(started) => {
            let payload = json!({
                "id": started.instance.id.0,
                "code": started.instance.code,
                "status": started.instance.status.label(),
                "progress": started.progress,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn instance_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.instance(&InspectionId(id)) {
        Ok(instance) => (
            StatusCode::OK,
            axum::Json(InspectionView::from_instance(&instance)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_step_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path((id, wizard, step)): Path<(String, String, u8)>,
    axum::Json(request): axum::Json<SaveStepRequest>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    let wizard = match parse_wizard(&wizard) {
        Ok(wizard) => wizard,
        Err(response) => return response,
    };
    let actor = ActorId(request.actor);
    match service.save_step(&InspectionId(id), wizard, step, request.payload, &actor) {
        Ok(saved) => (
            StatusCode::OK,
            axum::Json(SavedStepView {
                status: saved.status.label(),
                progress: saved.progress,
            }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path((id, wizard)): Path<(String, String)>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    let wizard = match parse_wizard(&wizard) {
        Ok(wizard) => wizard,
        Err(response) => return response,
    };
    match service.progress(&InspectionId(id), wizard) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.submit(&InspectionId(id), &ActorId(request.actor)) {
        Ok(instance) => (
            StatusCode::OK,
            axum::Json(InspectionView::from_instance(&instance)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.approve(&InspectionId(id), &ActorId(request.actor)) {
        Ok(instance) => (
            StatusCode::OK,
            axum::Json(InspectionView::from_instance(&instance)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.reject(&InspectionId(id), &ActorId(request.actor), &request.reason) {
        Ok(instance) => (
            StatusCode::OK,
            axum::Json(InspectionView::from_instance(&instance)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pre_trip_score_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.pre_trip_score(&InspectionId(id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn post_checklist_score_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.post_checklist_score(&InspectionId(id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn final_score_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.final_score(&InspectionId(id)) {
        Ok(score) => (StatusCode::OK, axum::Json(score)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn risk_score_handler<S, Z, A>(
    State(service): State<Arc<InspectionService<S, Z, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    match service.risk_score(&InspectionId(id)) {
        Ok(score) => (StatusCode::OK, axum::Json(score)).into_response(),
        Err(error) => error_response(error),
    }
}
