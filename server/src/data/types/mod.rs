//! Shared data types for the transactional store

mod enums;
mod transactional;

pub use enums::{EntityKind, UserRole};
pub use transactional::{
    CoursePage, CourseRow, CourseUpdate, CreatedAt, OrderRow, QuestionRow, ReplyRow, ReviewRow,
    UserRow,
};
