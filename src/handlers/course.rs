//! Course handlers under `/courses`.

use super::{body_to_map, parse_id, query_param};
use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{created, ok};
use crate::service::CourseService;
use crate::state::AppState;
use crate::store::{CourseFilter, CourseQuery, CourseSort, CourseSortKey, Page};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use std::collections::HashMap;

const NOT_FOUND: &str = "Course not found";

fn parse_sort(params: &HashMap<String, String>) -> Result<CourseSort, AppError> {
    let key = query_param::<CourseSortKey>(params, "sort")?.unwrap_or_default();
    let descending = match params.get("order").map(|o| o.trim().to_lowercase()) {
        None => false,
        Some(o) if o.is_empty() || o == "asc" => false,
        Some(o) if o == "desc" => true,
        Some(o) => return Err(AppError::BadRequest(format!("invalid order: {} (expected asc or desc)", o))),
    };
    Ok(CourseSort { key, descending })
}

/// `?sort=id|name|credits&order=asc|desc`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = CourseQuery {
        sort: parse_sort(&params)?,
        ..Default::default()
    };
    let rows = CourseService::list(state.courses.as_ref(), &query).await?;
    Ok(ok(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, NOT_FOUND)?;
    let row = CourseService::get(state.courses.as_ref(), id).await?;
    Ok(ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let row = CourseService::create(state.courses.as_ref(), body).await?;
    Ok(created(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, NOT_FOUND)?;
    let body = body_to_map(body)?;
    let row = CourseService::update(state.courses.as_ref(), id, body).await?;
    Ok(ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, NOT_FOUND)?;
    CourseService::delete(state.courses.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `?q=&is_active=&min_credits=&max_credits=&limit=&offset=&sort=&order=`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = CourseFilter {
        search: params
            .get("q")
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        is_active: query_param(&params, "is_active")?,
        min_credits: query_param(&params, "min_credits")?,
        max_credits: query_param(&params, "max_credits")?,
    };
    let page = Page::new(query_param(&params, "limit")?, query_param(&params, "offset")?);
    let query = CourseQuery {
        filter,
        sort: parse_sort(&params)?,
        page: Some(page),
    };
    let result = CourseService::search(state.courses.as_ref(), query).await?;
    Ok(ok(result))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = CourseService::stats(state.courses.as_ref()).await?;
    Ok(ok(stats))
}
