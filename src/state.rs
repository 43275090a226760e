//! Shared application state. Built explicitly at startup (or per test) and cloned into every handler.

use crate::store::{CourseRepository, MemoryStore, PgStore, StudentRepository};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentRepository>,
    pub courses: Arc<dyn CourseRepository>,
    /// Present when backed by PostgreSQL; used by the readiness check.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        AppState {
            students: store.clone(),
            courses: store,
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-memory state.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        AppState {
            students: store.clone(),
            courses: store,
            pool: None,
        }
    }
}
