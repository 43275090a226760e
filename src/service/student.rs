//! Student operations over any `StudentRepository`.

use crate::error::AppError;
use crate::model::{NewStudent, Student, StudentPatch};
use crate::store::{StudentFilter, StudentRepository};
use serde_json::{Map, Value};

pub struct StudentService;

impl StudentService {
    pub async fn list(repo: &dyn StudentRepository, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        repo.list(filter).await
    }

    pub async fn get(repo: &dyn StudentRepository, id: i64) -> Result<Student, AppError> {
        repo.get(id).await?.ok_or_else(not_found)
    }

    pub async fn create(repo: &dyn StudentRepository, body: Map<String, Value>) -> Result<Student, AppError> {
        let new = NewStudent::from_map(body)?;
        let student = repo.create(new).await?;
        tracing::info!(id = student.id, "student created");
        Ok(student)
    }

    /// Unknown id wins over a malformed payload, so both checks run in that order.
    pub async fn update(
        repo: &dyn StudentRepository,
        id: i64,
        body: Map<String, Value>,
    ) -> Result<Student, AppError> {
        if repo.get(id).await?.is_none() {
            return Err(not_found());
        }
        let patch = StudentPatch::from_map(body)?;
        let student = repo.update(id, &patch).await?.ok_or_else(not_found)?;
        tracing::info!(id, "student updated");
        Ok(student)
    }

    pub async fn delete(repo: &dyn StudentRepository, id: i64) -> Result<(), AppError> {
        if !repo.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!(id, "student deleted");
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Student not found".into())
}
