//! API route handlers

pub mod analytics;
pub mod courses;
pub mod health;
pub mod orders;
pub mod users;
