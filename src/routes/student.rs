//! Student routes, mounted under `/api/v1`.

use crate::handlers::student::{
    active, by_major, create, delete as delete_handler, gpa_range, list, read, search, update,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list).post(create))
        .route("/students/search", get(search))
        .route("/students/filter/active", get(active))
        .route("/students/filter/gpa-range", get(gpa_range))
        .route("/students/major/:major", get(by_major))
        .route(
            "/students/:id",
            get(read).put(update).delete(delete_handler),
        )
        .with_state(state)
}
