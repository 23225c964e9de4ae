pub mod auth;
pub mod submission;
pub mod timesheet;
