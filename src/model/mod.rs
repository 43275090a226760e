//! Plain data records. Storage lives behind the repository traits in `store`.

pub mod course;
pub mod student;

pub use course::{Course, CoursePatch, CourseStats, NewCourse};
pub use student::{NewStudent, Student, StudentPatch};
