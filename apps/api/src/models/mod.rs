pub mod analysis;
pub mod job;
pub mod resume;
pub mod user;
