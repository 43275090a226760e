//! Student handlers under `/students`.

use super::{body_to_map, parse_id, query_param};
use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{created, ok};
use crate::service::{RequestValidator, StudentService};
use crate::state::AppState;
use crate::store::StudentFilter;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use std::collections::HashMap;

const NOT_FOUND: &str = "Student not found";

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = StudentService::list(state.students.as_ref(), &StudentFilter::default()).await?;
    Ok(ok(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, NOT_FOUND)?;
    let row = StudentService::get(state.students.as_ref(), id).await?;
    Ok(ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let row = StudentService::create(state.students.as_ref(), body).await?;
    Ok(created(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, NOT_FOUND)?;
    let body = body_to_map(body)?;
    let row = StudentService::update(state.students.as_ref(), id, body).await?;
    Ok(ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, NOT_FOUND)?;
    StudentService::delete(state.students.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn by_major(
    State(state): State<AppState>,
    Path(major): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rows = StudentService::list(state.students.as_ref(), &StudentFilter::by_major(major)).await?;
    Ok(ok(rows))
}

pub async fn active(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = StudentService::list(state.students.as_ref(), &StudentFilter::active()).await?;
    Ok(ok(rows))
}

/// `?min_gpa=&max_gpa=`, both optional and inclusive.
pub async fn gpa_range(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let min_gpa: Option<f64> = query_param(&params, "min_gpa")?;
    let max_gpa: Option<f64> = query_param(&params, "max_gpa")?;
    for bound in [min_gpa, max_gpa].into_iter().flatten() {
        RequestValidator::gpa(bound)?;
    }
    if let (Some(min), Some(max)) = (min_gpa, max_gpa) {
        if min > max {
            return Err(AppError::BadRequest("min_gpa must not exceed max_gpa".into()));
        }
    }
    let filter = StudentFilter {
        min_gpa,
        max_gpa,
        ..Default::default()
    };
    let rows = StudentService::list(state.students.as_ref(), &filter).await?;
    Ok(ok(rows))
}

/// `?q=` matched case-insensitively against name, email and major.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let q = params
        .get("q")
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("query parameter q is required".into()))?;
    let filter = StudentFilter {
        search: Some(q),
        ..Default::default()
    };
    let rows = StudentService::list(state.students.as_ref(), &filter).await?;
    Ok(ok(rows))
}
