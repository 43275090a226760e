//! Repository traits over student and course storage, with PostgreSQL and in-memory backends.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::{Course, CoursePatch, CourseStats, NewCourse, NewStudent, Student, StudentPatch};
use async_trait::async_trait;

/// Exact-match and range filters for student listings. `None` means no constraint.
#[derive(Clone, Debug, Default)]
pub struct StudentFilter {
    pub major: Option<String>,
    pub is_active: Option<bool>,
    pub min_gpa: Option<f64>,
    pub max_gpa: Option<f64>,
    /// Case-insensitive substring over name, email and major.
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn by_major(major: impl Into<String>) -> Self {
        StudentFilter {
            major: Some(major.into()),
            ..Default::default()
        }
    }

    pub fn active() -> Self {
        StudentFilter {
            is_active: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, s: &Student) -> bool {
        if self.major.as_deref().is_some_and(|m| m != s.major) {
            return false;
        }
        if self.is_active.is_some_and(|a| a != s.is_active) {
            return false;
        }
        if self.min_gpa.is_some_and(|min| s.gpa < min) {
            return false;
        }
        if self.max_gpa.is_some_and(|max| s.gpa > max) {
            return false;
        }
        if let Some(q) = &self.search {
            let q = q.to_lowercase();
            return [&s.name, &s.email, &s.major]
                .iter()
                .any(|field| field.to_lowercase().contains(&q));
        }
        true
    }
}

#[derive(Clone, Debug, Default)]
pub struct CourseFilter {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub min_credits: Option<i32>,
    pub max_credits: Option<i32>,
}

impl CourseFilter {
    pub fn matches(&self, c: &Course) -> bool {
        if self.is_active.is_some_and(|a| a != c.is_active) {
            return false;
        }
        if self.min_credits.is_some_and(|min| c.credits < min) {
            return false;
        }
        if self.max_credits.is_some_and(|max| c.credits > max) {
            return false;
        }
        if let Some(q) = &self.search {
            let q = q.to_lowercase();
            return c.name.to_lowercase().contains(&q) || c.description.to_lowercase().contains(&q);
        }
        true
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CourseSortKey {
    #[default]
    Id,
    Name,
    Credits,
}

impl CourseSortKey {
    /// SQL sort expression. Names compare case-insensitively by code point,
    /// independent of the database collation.
    pub fn order_expr(self) -> &'static str {
        match self {
            CourseSortKey::Id => "id",
            CourseSortKey::Name => "LOWER(name) COLLATE \"C\"",
            CourseSortKey::Credits => "credits",
        }
    }
}

impl std::str::FromStr for CourseSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(CourseSortKey::Id),
            "name" => Ok(CourseSortKey::Name),
            "credits" => Ok(CourseSortKey::Credits),
            _ => Err(AppError::BadRequest(format!(
                "invalid sort key: {} (expected id, name or credits)",
                s
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CourseSort {
    pub key: CourseSortKey,
    pub descending: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Limit defaults to 20 and is capped at 100; offset defaults to 0.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Page {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CourseQuery {
    pub filter: CourseFilter,
    pub sort: CourseSort,
    /// `None` returns every match.
    pub page: Option<Page>,
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Matching students ordered by id.
    async fn list(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Student>, AppError>;

    /// Insert with defaults applied. Duplicate email is `AppError::Conflict`.
    async fn create(&self, new: NewStudent) -> Result<Student, AppError>;

    /// Apply the patch and refresh `updated_at`. `Ok(None)` when the id does not exist;
    /// an email owned by another student is `AppError::Conflict`.
    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Option<Student>, AppError>;

    /// Returns false when the id does not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn list(&self, query: &CourseQuery) -> Result<Vec<Course>, AppError>;

    async fn count(&self, filter: &CourseFilter) -> Result<u64, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Course>, AppError>;

    async fn create(&self, new: NewCourse) -> Result<Course, AppError>;

    async fn update(&self, id: i64, patch: &CoursePatch) -> Result<Option<Course>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn stats(&self) -> Result<CourseStats, AppError>;
}
