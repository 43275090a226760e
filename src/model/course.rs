//! Course record. Identity is the id alone.

use crate::error::AppError;
use crate::service::{RequestValidator, COURSE_NAME_MAX};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub credits: i32,
    pub description: String,
    pub is_active: bool,
}

impl Course {
    /// Active course with an empty description.
    pub fn new(id: i64, name: impl Into<String>, credits: i32) -> Self {
        Course {
            id,
            name: name.into(),
            credits,
            description: String::new(),
            is_active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Credits within 1..=6.
    pub fn validate_credits(&self) -> bool {
        crate::service::credits_in_range(self.credits)
    }

    pub fn status(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }

    /// No capacity or prerequisite model exists; eligibility is the active flag.
    pub fn is_available_for_enrollment(&self) -> bool {
        self.is_active
    }
}

impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Course {}

impl Hash for Course {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Course(id={}, name='{}', credits={})",
            self.id, self.name, self.credits
        )
    }
}

impl Serialize for Course {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Course", 6)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("credits", &self.credits)?;
        s.serialize_field("description", &self.description)?;
        s.serialize_field("is_active", &self.is_active)?;
        s.serialize_field("status", self.status())?;
        s.end()
    }
}

fn check_name(name: &str) -> Result<(), AppError> {
    RequestValidator::not_blank("name", name)?;
    RequestValidator::max_len("name", name, COURSE_NAME_MAX)
}

fn from_body<T: serde::de::DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::BadRequest(format!("Invalid value: {}", e)))
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub credits: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewCourse {
    pub fn from_map(body: Map<String, Value>) -> Result<Self, AppError> {
        RequestValidator::require_fields(&body, &["name", "credits"])?;
        let new: NewCourse = from_body(body)?;
        check_name(&new.name)?;
        RequestValidator::credits(new.credits)?;
        Ok(new)
    }

    pub fn into_course(self, id: i64) -> Course {
        Course {
            id,
            name: self.name,
            credits: self.credits,
            description: self.description.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CoursePatch {
    pub fn from_map(body: Map<String, Value>) -> Result<Self, AppError> {
        let patch: CoursePatch = from_body(body)?;
        if let Some(credits) = patch.credits {
            RequestValidator::credits(credits)?;
        }
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        Ok(patch)
    }

    pub fn apply(&self, course: &mut Course) {
        if let Some(name) = &self.name {
            course.name = name.clone();
        }
        if let Some(credits) = self.credits {
            course.credits = credits;
        }
        if let Some(description) = &self.description {
            course.description = description.clone();
        }
        if let Some(active) = self.is_active {
            course.is_active = active;
        }
    }
}

/// Aggregate figures over every stored course.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub total_credits: i64,
    pub average_credits: f64,
}

impl CourseStats {
    pub fn from_counts(total: u64, active: u64, total_credits: i64) -> Self {
        let average_credits = if total == 0 {
            0.0
        } else {
            total_credits as f64 / total as f64
        };
        CourseStats {
            total,
            active,
            inactive: total.saturating_sub(active),
            total_credits,
            average_credits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn new_uses_defaults() {
        let c = Course::new(2, "Data Structures", 4);
        assert_eq!(c.id, 2);
        assert_eq!(c.name, "Data Structures");
        assert_eq!(c.credits, 4);
        assert_eq!(c.description, "");
        assert!(c.is_active);
    }

    #[test]
    fn builder_sets_optional_fields() {
        let c = Course::new(1, "Introduction to Python", 3)
            .with_description("Learn Python programming")
            .with_active(false);
        assert_eq!(c.description, "Learn Python programming");
        assert!(!c.is_active);
    }

    #[test]
    fn credits_between_one_and_six() {
        for credits in 1..=6 {
            assert!(Course::new(1, "Test Course", credits).validate_credits());
        }
        for credits in [0, -1, 7, 10, 100] {
            assert!(!Course::new(1, "Test Course", credits).validate_credits());
        }
    }

    #[test]
    fn status_follows_active_flag() {
        let active = Course::new(1, "Active Course", 3);
        let inactive = Course::new(2, "Inactive Course", 3).with_active(false);
        assert_eq!(active.status(), "Active");
        assert_eq!(inactive.status(), "Inactive");
        assert!(active.is_available_for_enrollment());
        assert!(!inactive.is_available_for_enrollment());
    }

    #[test]
    fn display_contains_type_and_name() {
        let s = Course::new(1, "Test Course", 3).to_string();
        assert!(s.contains("Course"));
        assert!(s.contains("Test Course"));
    }

    #[test]
    fn equality_is_by_id() {
        let a = Course::new(1, "Course A", 3);
        let b = Course::new(1, "Course B", 4);
        let c = Course::new(2, "Course A", 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(Some(a.clone()), None);

        let set: HashSet<Course> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_status() {
        let v = serde_json::to_value(Course::new(3, "Logic", 2).with_active(false)).unwrap();
        assert_eq!(v["status"], "Inactive");
        assert_eq!(v["description"], "");
    }

    #[test]
    fn new_course_validation() {
        let ok = NewCourse::from_map(json!({"name": "Logic", "credits": 3}).as_object().cloned().unwrap()).unwrap();
        let c = ok.into_course(9);
        assert_eq!(c.description, "");
        assert!(c.is_active);

        let missing = NewCourse::from_map(json!({"name": "Logic"}).as_object().cloned().unwrap());
        assert!(matches!(missing, Err(AppError::Validation(_))));
        let too_many = NewCourse::from_map(json!({"name": "Logic", "credits": 7}).as_object().cloned().unwrap());
        assert!(matches!(too_many, Err(AppError::Validation(_))));
        let blank = NewCourse::from_map(json!({"name": " ", "credits": 3}).as_object().cloned().unwrap());
        assert!(matches!(blank, Err(AppError::Validation(_))));
        let long_name = "c".repeat(COURSE_NAME_MAX + 1);
        let err = NewCourse::from_map(json!({"name": long_name, "credits": 3}).as_object().cloned().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }

    #[test]
    fn patch_applies_present_fields() {
        let mut c = Course::new(1, "Logic", 3);
        let patch = CoursePatch::from_map(json!({"credits": 5}).as_object().cloned().unwrap()).unwrap();
        patch.apply(&mut c);
        assert_eq!(c.credits, 5);
        assert_eq!(c.name, "Logic");
        assert!(CoursePatch::from_map(json!({"credits": 0}).as_object().cloned().unwrap()).is_err());
        let long_name = "c".repeat(COURSE_NAME_MAX + 1);
        assert!(CoursePatch::from_map(json!({"name": long_name}).as_object().cloned().unwrap()).is_err());
    }

    #[test]
    fn stats_average() {
        let s = CourseStats::from_counts(4, 3, 14);
        assert_eq!(s.inactive, 1);
        assert_eq!(s.average_credits, 3.5);
        assert_eq!(CourseStats::from_counts(0, 0, 0).average_credits, 0.0);
    }
}
