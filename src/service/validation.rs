//! Field validators and request presence checks.

use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

pub const GPA_MIN: f64 = 0.0;
pub const GPA_MAX: f64 = 4.0;
pub const CREDITS_MIN: i32 = 1;
pub const CREDITS_MAX: i32 = 6;

/// Column widths of the `students` and `courses` tables.
pub const STUDENT_NAME_MAX: usize = 100;
pub const STUDENT_EMAIL_MAX: usize = 120;
pub const STUDENT_MAJOR_MAX: usize = 100;
pub const COURSE_NAME_MAX: usize = 200;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Syntactic check for `local@domain.tld`. No DNS lookup.
pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Closed interval [0.0, 4.0]. NaN is out of range.
pub fn gpa_in_range(gpa: f64) -> bool {
    (GPA_MIN..=GPA_MAX).contains(&gpa)
}

/// Float conversion for a GPA field: JSON numbers and numeric strings.
pub fn coerce_gpa(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// True iff the value converts to a float inside [0.0, 4.0].
pub fn validate_gpa(value: &Value) -> bool {
    coerce_gpa(value).map(gpa_in_range).unwrap_or(false)
}

pub fn credits_in_range(credits: i32) -> bool {
    (CREDITS_MIN..=CREDITS_MAX).contains(&credits)
}

pub struct RequestValidator;

impl RequestValidator {
    /// Every key must be present in the body. Presence only: a `null` value still counts.
    pub fn require_fields(body: &Map<String, Value>, fields: &[&str]) -> Result<(), AppError> {
        if fields.iter().all(|f| body.contains_key(*f)) {
            Ok(())
        } else {
            Err(AppError::Validation("Missing required fields".into()))
        }
    }

    /// Length in characters, matching `VARCHAR(n)`.
    pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
        if value.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
        Ok(())
    }

    pub fn not_blank(field: &str, value: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} must not be empty", field)));
        }
        Ok(())
    }

    pub fn email(email: &str) -> Result<(), AppError> {
        if validate_email(email) {
            Ok(())
        } else {
            Err(AppError::Validation(format!("Invalid email: {}", email)))
        }
    }

    pub fn gpa(gpa: f64) -> Result<(), AppError> {
        if gpa_in_range(gpa) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "gpa must be between {:.1} and {:.1}",
                GPA_MIN, GPA_MAX
            )))
        }
    }

    pub fn credits(credits: i32) -> Result<(), AppError> {
        if credits_in_range(credits) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "credits must be between {} and {}",
                CREDITS_MIN, CREDITS_MAX
            )))
        }
    }
}
