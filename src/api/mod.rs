pub mod attendance;
pub mod report;
pub mod shift;
pub mod user;
