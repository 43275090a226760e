//! Course operations over any `CourseRepository`.

use crate::error::AppError;
use crate::model::{Course, CoursePatch, CourseStats, NewCourse};
use crate::store::{CourseQuery, CourseRepository, Page};
use serde::Serialize;
use serde_json::{Map, Value};

/// One page of search results plus the total match count.
#[derive(Debug, Serialize)]
pub struct CoursePage {
    pub items: Vec<Course>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

pub struct CourseService;

impl CourseService {
    pub async fn list(repo: &dyn CourseRepository, query: &CourseQuery) -> Result<Vec<Course>, AppError> {
        repo.list(query).await
    }

    /// Paged search. The page defaults are applied when `query.page` is unset.
    pub async fn search(repo: &dyn CourseRepository, mut query: CourseQuery) -> Result<CoursePage, AppError> {
        let page = *query.page.get_or_insert_with(|| Page::new(None, None));
        let total = repo.count(&query.filter).await?;
        let items = repo.list(&query).await?;
        Ok(CoursePage {
            items,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    pub async fn get(repo: &dyn CourseRepository, id: i64) -> Result<Course, AppError> {
        repo.get(id).await?.ok_or_else(not_found)
    }

    pub async fn create(repo: &dyn CourseRepository, body: Map<String, Value>) -> Result<Course, AppError> {
        let new = NewCourse::from_map(body)?;
        let course = repo.create(new).await?;
        tracing::info!(id = course.id, "course created");
        Ok(course)
    }

    pub async fn update(
        repo: &dyn CourseRepository,
        id: i64,
        body: Map<String, Value>,
    ) -> Result<Course, AppError> {
        if repo.get(id).await?.is_none() {
            return Err(not_found());
        }
        let patch = CoursePatch::from_map(body)?;
        let course = repo.update(id, &patch).await?.ok_or_else(not_found)?;
        tracing::info!(id, "course updated");
        Ok(course)
    }

    pub async fn delete(repo: &dyn CourseRepository, id: i64) -> Result<(), AppError> {
        if !repo.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!(id, "course deleted");
        Ok(())
    }

    pub async fn stats(repo: &dyn CourseRepository) -> Result<CourseStats, AppError> {
        repo.stats().await
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Course not found".into())
}
