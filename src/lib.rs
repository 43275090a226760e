//! Campus registry: REST backend for student and course records.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use migration::{ensure_database_exists, ensure_tables};
pub use model::{Course, Student};
pub use routes::{app, common_routes, course_routes, student_routes, with_layers};
pub use state::AppState;
pub use store::{CourseRepository, MemoryStore, PgStore, StudentRepository};
