//! Request-level operations: validate the payload, then call the repository.

mod course;
mod student;
mod validation;

pub use course::CourseService;
pub use student::StudentService;
pub use validation::{
    coerce_gpa, credits_in_range, gpa_in_range, validate_email, validate_gpa, RequestValidator,
    COURSE_NAME_MAX, STUDENT_EMAIL_MAX, STUDENT_MAJOR_MAX, STUDENT_NAME_MAX,
};
