//! PostgreSQL store. Writes run in a transaction; an early `?` drops it uncommitted, which rolls back.

use super::{CourseFilter, CourseQuery, CourseRepository, StudentFilter, StudentRepository};
use crate::error::AppError;
use crate::model::{Course, CoursePatch, CourseStats, NewCourse, NewStudent, Student, StudentPatch};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const STUDENT_COLUMNS: &str = "id, name, email, major, gpa, is_active, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, name, credits, description, is_active";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// ILIKE pattern matching `q` anywhere, with LIKE wildcards in `q` escaped.
fn contains_pattern(q: &str) -> String {
    let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_student_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &StudentFilter) {
    if let Some(major) = &filter.major {
        qb.push(" AND major = ").push_bind(major.clone());
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(min) = filter.min_gpa {
        qb.push(" AND gpa >= ").push_bind(min);
    }
    if let Some(max) = filter.max_gpa {
        qb.push(" AND gpa <= ").push_bind(max);
    }
    if let Some(q) = &filter.search {
        let pattern = contains_pattern(q);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR major ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_course_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CourseFilter) {
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(min) = filter.min_credits {
        qb.push(" AND credits >= ").push_bind(min);
    }
    if let Some(max) = filter.max_credits {
        qb.push(" AND credits <= ").push_bind(max);
    }
    if let Some(q) = &filter.search {
        let pattern = contains_pattern(q);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl StudentRepository for PgStore {
    async fn list(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM students WHERE TRUE", STUDENT_COLUMNS));
        push_student_filter(&mut qb, filter);
        qb.push(" ORDER BY id");
        tracing::debug!(sql = %qb.sql(), "query");
        let rows = qb.build_query_as::<Student>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, new: NewStudent) -> Result<Student, AppError> {
        let mut tx = self.pool.begin().await?;
        let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE email = $1")
            .bind(&new.email)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email already exists".into()));
        }
        let sql = format!(
            "INSERT INTO students (name, email, major, gpa, is_active) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            STUDENT_COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        // A concurrent insert of the same email surfaces as a unique violation, mapped to Conflict.
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.major)
            .bind(new.gpa())
            .bind(new.is_active())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Option<Student>, AppError> {
        let mut tx = self.pool.begin().await?;
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            let owner: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            if owner.is_some() {
                return Err(AppError::Conflict("Email already exists".into()));
            }
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE students SET updated_at = NOW()");
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(email) = &patch.email {
            qb.push(", email = ").push_bind(email.clone());
        }
        if let Some(major) = &patch.major {
            qb.push(", major = ").push_bind(major.clone());
        }
        if let Some(gpa) = patch.gpa {
            qb.push(", gpa = ").push_bind(gpa);
        }
        if let Some(active) = patch.is_active {
            qb.push(", is_active = ").push_bind(active);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {}", STUDENT_COLUMNS));
        tracing::debug!(sql = %qb.sql(), "query (tx)");
        let row = qb.build_query_as::<Student>().fetch_one(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CourseRepository for PgStore {
    async fn list(&self, query: &CourseQuery) -> Result<Vec<Course>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM courses WHERE TRUE", COURSE_COLUMNS));
        push_course_filter(&mut qb, &query.filter);
        let dir = if query.sort.descending { "DESC" } else { "ASC" };
        qb.push(format!(" ORDER BY {} {}, id {}", query.sort.key.order_expr(), dir, dir));
        if let Some(page) = query.page {
            qb.push(" LIMIT ")
                .push_bind(i64::from(page.limit))
                .push(" OFFSET ")
                .push_bind(i64::from(page.offset));
        }
        tracing::debug!(sql = %qb.sql(), "query");
        let rows = qb.build_query_as::<Course>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(&self, filter: &CourseFilter) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses WHERE TRUE");
        push_course_filter(&mut qb, filter);
        let n = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }

    async fn get(&self, id: i64) -> Result<Option<Course>, AppError> {
        let sql = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        let row = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, new: NewCourse) -> Result<Course, AppError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO courses (name, credits, description, is_active) VALUES ($1, $2, $3, $4) RETURNING {}",
            COURSE_COLUMNS
        );
        let row = sqlx::query_as::<_, Course>(&sql)
            .bind(&new.name)
            .bind(new.credits)
            .bind(new.description.clone().unwrap_or_default())
            .bind(new.is_active.unwrap_or(true))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: &CoursePatch) -> Result<Option<Course>, AppError> {
        let mut tx = self.pool.begin().await?;
        // `id = id` keeps the SET list non-empty when the patch is empty.
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE courses SET id = id");
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(credits) = patch.credits {
            qb.push(", credits = ").push_bind(credits);
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(active) = patch.is_active {
            qb.push(", is_active = ").push_bind(active);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {}", COURSE_COLUMNS));
        let row = qb.build_query_as::<Course>().fetch_optional(&mut *tx).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<CourseStats, AppError> {
        let (total, active, credits): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active), COALESCE(SUM(credits), 0)::BIGINT FROM courses",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(CourseStats::from_counts(total.max(0) as u64, active.max(0) as u64, credits))
    }
}
