use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ImportRow, PositionId};
use super::service::{RegistryError, RegistryService};
use super::store::PositionStore;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    #[serde(default)]
    pub display_text: Option<String>,
    #[serde(default)]
    pub selected_id: Option<PositionId>,
}

/// Router builder exposing the admin endpoints for kindness positions.
pub fn registry_router<S>(service: Arc<RegistryService<S>>) -> Router
where
    S: PositionStore + 'static,
{
    Router::new()
        .route("/api/admin/kindness", get(search_handler::<S>))
        .route("/api/admin/kindness/:id", delete(delete_handler::<S>))
        .route(
            "/api/admin/kindness/deleterange",
            post(delete_range_handler::<S>),
        )
        .route(
            "/api/admin/kindness/deleteall",
            post(delete_all_handler::<S>),
        )
        .route("/api/admin/kindness/import", post(import_handler::<S>))
        .route(
            "/api/admin/kindness/saveposition",
            post(reassign_handler::<S>),
        )
        .with_state(service)
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "success": false,
        "message": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}

fn internal_error(error: RegistryError) -> Response {
    tracing::error!(%error, "registry operation failed");
    failure(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: PositionStore + 'static,
{
    match service.search(params.search.as_deref()) {
        Ok(positions) => (StatusCode::OK, axum::Json(json!({ "data": positions }))).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    Path(id): Path<i64>,
) -> Response
where
    S: PositionStore + 'static,
{
    match service.delete(PositionId(id)) {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "message": "deleted",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(RegistryError::NotFound(_)) => failure(StatusCode::BAD_REQUEST, "delete failed"),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn delete_range_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    axum::Json(ids): axum::Json<Vec<PositionId>>,
) -> Response
where
    S: PositionStore + 'static,
{
    match service.delete_many(&ids) {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn delete_all_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
) -> Response
where
    S: PositionStore + 'static,
{
    match service.delete_all() {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn import_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    axum::Json(rows): axum::Json<Vec<ImportRow>>,
) -> Response
where
    S: PositionStore + 'static,
{
    match service.import(rows) {
        Ok(imported) => {
            let payload = json!({
                "success": true,
                "imported": imported,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(RegistryError::Validation(report)) => {
            let payload = json!({
                "success": false,
                "errors": report,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(error @ RegistryError::Conflict { .. }) => {
            failure(StatusCode::CONFLICT, error.to_string())
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn reassign_handler<S>(
    State(service): State<Arc<RegistryService<S>>>,
    axum::Json(request): axum::Json<ReassignRequest>,
) -> Response
where
    S: PositionStore + 'static,
{
    let display_text = request.display_text.unwrap_or_default();
    let Some(target) = request.selected_id else {
        if let Err(error) = service.codec().parse(&display_text) {
            return failure(StatusCode::BAD_REQUEST, error.to_string());
        }
        return match service.store().get_by_code(&display_text) {
            Ok(Some(_)) => failure(StatusCode::CONFLICT, "selected position is already in use"),
            Ok(None) => failure(StatusCode::NOT_FOUND, "selected position does not exist"),
            Err(error) => internal_error(error.into()),
        };
    };

    match service.reassign(&display_text, target) {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(error @ RegistryError::Format(_)) => failure(StatusCode::BAD_REQUEST, error.to_string()),
        Err(RegistryError::Conflict { .. }) => {
            failure(StatusCode::CONFLICT, "selected position is already in use")
        }
        Err(RegistryError::NotFound(_)) => {
            failure(StatusCode::NOT_FOUND, "selected position does not exist")
        }
        Err(other) => internal_error(other),
    }
}
