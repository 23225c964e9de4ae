pub mod job;
pub mod submission;
pub mod time_entry;
pub mod user;
