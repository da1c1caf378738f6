pub mod attendance;
pub mod branch;
pub mod profile;
pub mod schedule;
