//! In-process store. One mutex guards both tables, so every operation is atomic.

use super::{CourseFilter, CourseQuery, CourseRepository, CourseSortKey, StudentFilter, StudentRepository};
use crate::error::AppError;
use crate::model::{Course, CoursePatch, CourseStats, NewCourse, NewStudent, Student, StudentPatch};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    students: BTreeMap<i64, Student>,
    courses: BTreeMap<i64, Course>,
    last_student_id: i64,
    last_course_id: i64,
}

impl Tables {
    fn email_owner(&self, email: &str) -> Option<i64> {
        self.students.values().find(|s| s.email == email).map(|s| s.id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn list(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let t = self.lock()?;
        Ok(t.students.values().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Student>, AppError> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    async fn create(&self, new: NewStudent) -> Result<Student, AppError> {
        let mut t = self.lock()?;
        if t.email_owner(&new.email).is_some() {
            return Err(AppError::Conflict("Email already exists".into()));
        }
        t.last_student_id += 1;
        let student = new.into_student(t.last_student_id, Utc::now());
        t.students.insert(student.id, student.clone());
        tracing::debug!(id = student.id, "memory: student inserted");
        Ok(student)
    }

    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Option<Student>, AppError> {
        let mut t = self.lock()?;
        if !t.students.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            if t.email_owner(email).is_some_and(|owner| owner != id) {
                return Err(AppError::Conflict("Email already exists".into()));
            }
        }
        let Some(student) = t.students.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(student, Utc::now());
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.lock()?.students.remove(&id).is_some())
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn list(&self, query: &CourseQuery) -> Result<Vec<Course>, AppError> {
        let t = self.lock()?;
        let mut rows: Vec<Course> = t
            .courses
            .values()
            .filter(|c| query.filter.matches(c))
            .cloned()
            .collect();
        // BTreeMap order is by id, and both sorts are stable, so ties keep id order.
        match query.sort.key {
            CourseSortKey::Id => {}
            CourseSortKey::Name => rows.sort_by_cached_key(|c| c.name.to_lowercase()),
            CourseSortKey::Credits => rows.sort_by_key(|c| c.credits),
        }
        if query.sort.descending {
            rows.reverse();
        }
        if let Some(page) = query.page {
            rows = rows
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect();
        }
        Ok(rows)
    }

    async fn count(&self, filter: &CourseFilter) -> Result<u64, AppError> {
        let t = self.lock()?;
        Ok(t.courses.values().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn get(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.lock()?.courses.get(&id).cloned())
    }

    async fn create(&self, new: NewCourse) -> Result<Course, AppError> {
        let mut t = self.lock()?;
        t.last_course_id += 1;
        let course = new.into_course(t.last_course_id);
        t.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update(&self, id: i64, patch: &CoursePatch) -> Result<Option<Course>, AppError> {
        let mut t = self.lock()?;
        Ok(t.courses.get_mut(&id).map(|c| {
            patch.apply(c);
            c.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.lock()?.courses.remove(&id).is_some())
    }

    async fn stats(&self) -> Result<CourseStats, AppError> {
        let t = self.lock()?;
        let total = t.courses.len() as u64;
        let active = t.courses.values().filter(|c| c.is_active).count() as u64;
        let credits = t.courses.values().map(|c| i64::from(c.credits)).sum();
        Ok(CourseStats::from_counts(total, active, credits))
    }
}
