pub mod admin;
pub mod submission;
