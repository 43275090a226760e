//! Router assembly: common routes at the root, resources under `/api/v1`, plus cross-cutting layers.

mod common;
mod course;
mod student;

pub use common::{common_routes, not_found};
pub use course::course_routes;
pub use student::student_routes;

use crate::config::Settings;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as CorsAny, CorsLayer},
    trace::TraceLayer,
};

pub const API_PREFIX: &str = "/api/v1";

/// Last-resort handler: a panicking handler yields the standard 500 body.
fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Internal("handler panicked".into()).into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(CorsAny)
        .allow_headers(CorsAny)
}

/// The full application router.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let api = Router::new()
        .merge(student_routes(state.clone()))
        .merge(course_routes(state.clone()));

    let router = Router::new()
        .merge(common_routes(state))
        .nest(API_PREFIX, api)
        .fallback(not_found);
    with_layers(router, settings)
}

/// Cross-cutting layers applied to every route: panic recovery, request tracing,
/// CORS and the JSON body size limit.
pub fn with_layers(router: Router, settings: &Settings) -> Router {
    router
        .layer(DefaultBodyLimit::max(settings.body_limit_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&settings.allowed_origins)),
        )
}
