//! Student record, its create payload and its partial-update payload.

use crate::error::AppError;
use crate::service::{
    coerce_gpa, RequestValidator, STUDENT_EMAIL_MAX, STUDENT_MAJOR_MAX, STUDENT_NAME_MAX,
};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// GPA at or above which a student is on the honor roll.
pub const HONOR_GPA: f64 = 3.5;
pub const REQUIRED_FIELDS: &[&str] = &["name", "email", "major"];

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub major: String,
    pub gpa: f64,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn is_honor_student(&self) -> bool {
        self.gpa >= HONOR_GPA
    }

    /// Year of study (1-4): whole years since enrollment, plus one.
    pub fn year_of_study(&self, now: DateTime<Utc>) -> u8 {
        let Some(created) = self.created_at else {
            return 1;
        };
        let years = (now - created).num_days().max(0) / 365;
        (years + 1).clamp(1, 4) as u8
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Student {}>", self.name)
    }
}

fn deserialize_gpa<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    if v.is_null() {
        return Ok(None);
    }
    coerce_gpa(&v)
        .map(Some)
        .ok_or_else(|| de::Error::custom("gpa must be a number"))
}

fn check_name(name: &str) -> Result<(), AppError> {
    RequestValidator::not_blank("name", name)?;
    RequestValidator::max_len("name", name, STUDENT_NAME_MAX)
}

fn check_email(email: &str) -> Result<(), AppError> {
    RequestValidator::max_len("email", email, STUDENT_EMAIL_MAX)?;
    RequestValidator::email(email)
}

fn check_major(major: &str) -> Result<(), AppError> {
    RequestValidator::not_blank("major", major)?;
    RequestValidator::max_len("major", major, STUDENT_MAJOR_MAX)
}

fn from_body<T: serde::de::DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::BadRequest(format!("Invalid value: {}", e)))
}

/// Fields accepted by create. Optional fields fall back to the column defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub major: String,
    #[serde(default, deserialize_with = "deserialize_gpa")]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewStudent {
    /// Build from a request body: required keys present, types convertible,
    /// text fields non-blank and within column width, email well-formed, gpa in range.
    pub fn from_map(body: Map<String, Value>) -> Result<Self, AppError> {
        RequestValidator::require_fields(&body, REQUIRED_FIELDS)?;
        let new: NewStudent = from_body(body)?;
        check_name(&new.name)?;
        check_email(&new.email)?;
        check_major(&new.major)?;
        RequestValidator::gpa(new.gpa())?;
        Ok(new)
    }

    pub fn gpa(&self) -> f64 {
        self.gpa.unwrap_or(0.0)
    }

    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    /// Materialize as a stored record with the given id and timestamp.
    pub fn into_student(self, id: i64, now: DateTime<Utc>) -> Student {
        Student {
            id,
            gpa: self.gpa(),
            is_active: self.is_active(),
            name: self.name,
            email: self.email,
            major: self.major,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Partial update: only `Some` fields are written. A JSON `null` is treated as absent.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub major: Option<String>,
    #[serde(deserialize_with = "deserialize_gpa")]
    pub gpa: Option<f64>,
    pub is_active: Option<bool>,
}

impl StudentPatch {
    pub fn from_map(body: Map<String, Value>) -> Result<Self, AppError> {
        let patch: StudentPatch = from_body(body)?;
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        if let Some(email) = &patch.email {
            check_email(email)?;
        }
        if let Some(major) = &patch.major {
            check_major(major)?;
        }
        if let Some(gpa) = patch.gpa {
            RequestValidator::gpa(gpa)?;
        }
        Ok(patch)
    }

    pub fn apply(&self, student: &mut Student, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(email) = &self.email {
            student.email = email.clone();
        }
        if let Some(major) = &self.major {
            student.major = major.clone();
        }
        if let Some(gpa) = self.gpa {
            student.gpa = gpa;
        }
        if let Some(active) = self.is_active {
            student.is_active = active;
        }
        student.updated_at = Some(now);
    }
}
