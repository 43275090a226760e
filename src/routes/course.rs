//! Course routes, mounted under `/api/v1`.

use crate::handlers::course::{
    create, delete as delete_handler, list, read, search, stats, update,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn course_routes(state: AppState) -> Router {
    Router::new()
        .route("/courses", get(list).post(create))
        .route("/courses/search", get(search))
        .route("/courses/stats", get(stats))
        .route(
            "/courses/:id",
            get(read).put(update).delete(delete_handler),
        )
        .with_state(state)
}
