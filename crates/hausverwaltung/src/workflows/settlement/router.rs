use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{PropertyId, SettlementError};
use super::repository::{CompletionNotifier, PropertyRepository, RepositoryError};
use super::service::{
    NewProperty, Reconfiguration, SettlementService, SettlementServiceError, TaskResponse,
};
use super::snapshot::PortfolioSnapshot;

/// Router builder exposing the settlement endpoints.
pub fn settlement_router<R, N>(service: Arc<SettlementService<R, N>>) -> Router
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            post(create_handler::<R, N>).get(list_handler::<R, N>),
        )
        .route(
            "/api/v1/properties/:property_id",
            get(detail_handler::<R, N>).delete(remove_handler::<R, N>),
        )
        .route(
            "/api/v1/properties/:property_id/checklist/:task",
            post(respond_handler::<R, N>),
        )
        .route(
            "/api/v1/properties/:property_id/configuration",
            post(reconfigure_handler::<R, N>),
        )
        .route(
            "/api/v1/portfolio/summary",
            get(summary_handler::<R, N>),
        )
        .route(
            "/api/v1/portfolio/export",
            get(export_handler::<R, N>),
        )
        .route(
            "/api/v1/portfolio/import",
            post(import_handler::<R, N>),
        )
        .with_state(service)
}

fn error_response(error: SettlementServiceError) -> Response {
    let status = match &error {
        SettlementServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SettlementServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        SettlementServiceError::Settlement(SettlementError::TaskNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        SettlementServiceError::Settlement(SettlementError::StatusNotSupported(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SettlementServiceError::Snapshot(_) => StatusCode::BAD_REQUEST,
        SettlementServiceError::Repository(RepositoryError::Unavailable(_))
        | SettlementServiceError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    axum::Json(intake): axum::Json<NewProperty>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.create(intake) {
        Ok(property) => (StatusCode::CREATED, axum::Json(property)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.overviews() {
        Ok(overviews) => (StatusCode::OK, axum::Json(overviews)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    let id = PropertyId(property_id);
    match service.get(&id).and_then(|property| {
        let stats = service.stats(&id)?;
        Ok(json!({ "property": property, "stats": stats }))
    }) {
        Ok(payload) => (StatusCode::OK, axum::Json(payload)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.remove(&PropertyId(property_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn respond_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    Path((property_id, task)): Path<(String, String)>,
    axum::Json(response): axum::Json<TaskResponse>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.respond(&PropertyId(property_id), &task, response) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reconfigure_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    Path(property_id): Path<String>,
    axum::Json(requested): axum::Json<Reconfiguration>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.reconfigure(&PropertyId(property_id), requested) {
        Ok(property) => (StatusCode::OK, axum::Json(property)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.portfolio_summary() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.export() {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    axum::Json(snapshot): axum::Json<PortfolioSnapshot>,
) -> Response
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    match service.import(snapshot) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}
