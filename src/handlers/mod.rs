//! HTTP handlers for students and courses.

pub mod course;
pub mod student;

use crate::error::AppError;
use serde_json::{Map, Value};

/// Path ids that are not integers cannot name a record, so they are a 404 like any unknown id.
fn parse_id(id_str: &str, not_found: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::NotFound(not_found.to_string()))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Optional typed query parameter; a present but unparsable value is a 400.
fn query_param<T: std::str::FromStr>(
    params: &std::collections::HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid {}: {}", key, v))),
    }
}
