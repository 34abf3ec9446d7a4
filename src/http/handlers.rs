//! Route handlers.
//!
//! Handlers only translate between HTTP and the core: parse ids and bodies,
//! call the admission controller, room registry or query engine, and shape
//! the answer. Every failure goes through [`ApiError`].

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::{OccupancyError, Room, RoomId, RoomOccupancy, Visit, VisitId, VisitorInput};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::query::{
    ActiveVisitor, ActiveVisitorsParams, AuditParams, HistoryItem, HistoryParams, LogRow, Page,
};
use crate::security::Caller;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub room_id: String,
    pub name: String,
    pub cpf: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub capacity: i64,
}

fn parse_room_id(raw: &str) -> Result<RoomId, OccupancyError> {
    Uuid::parse_str(raw.trim()).map_err(|_| OccupancyError::RoomNotFound(raw.to_string()))
}

fn parse_visit_id(raw: &str) -> Result<VisitId, OccupancyError> {
    Uuid::parse_str(raw.trim()).map_err(|_| OccupancyError::VisitNotFound(raw.to_string()))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomOccupancy>> {
    Json(state.queries.rooms_with_active_counts())
}

pub async fn create_room(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    let Json(body) = payload?;
    let room = state
        .rooms
        .create_room(&body.name, body.capacity, Some(caller.subject.as_str()))
        .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update_room(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRoomRequest>, JsonRejection>,
) -> ApiResult<Json<Room>> {
    let room_id = parse_room_id(&id)?;
    let Json(body) = payload?;
    let room = state
        .rooms
        .update_capacity(room_id, body.capacity, Some(caller.subject.as_str()))
        .await?;
    Ok(Json(room))
}

pub async fn active_visitors(
    State(state): State<AppState>,
    params: Result<Query<ActiveVisitorsParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ActiveVisitor>>> {
    let Query(params) = params?;
    let filter = params.into_filter()?;
    Ok(Json(state.queries.active_visitors(&filter)))
}

pub async fn check_in(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = payload?;
    // Malformed visitor data is a 400 even when the room id is also bad.
    let visitor = VisitorInput {
        name: body.name,
        cpf: body.cpf,
        email: body.email,
        birth_date: body.birth_date,
    }
    .validate()?;
    let room_id = parse_room_id(&body.room_id)?;

    let visit = state
        .admission
        .admit(room_id, visitor, Some(caller.subject.as_str()))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": visit.id }))))
}

pub async fn get_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Visit>> {
    let visit_id = parse_visit_id(&id)?;
    Ok(Json(state.admission.visit(visit_id)?))
}

pub async fn check_out(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let visit_id = parse_visit_id(&id)?;
    state
        .admission
        .check_out(visit_id, Some(caller.subject.as_str()))
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<Json<Page<HistoryItem>>> {
    let Query(params) = params?;
    let filter = params.into_filter()?;
    Ok(Json(state.queries.history(&filter)))
}

pub async fn logs(
    State(state): State<AppState>,
    params: Result<Query<AuditParams>, QueryRejection>,
) -> ApiResult<Json<Page<LogRow>>> {
    let Query(params) = params?;
    let filter = params.into_filter()?;
    Ok(Json(state.queries.audit_log(&filter)))
}
