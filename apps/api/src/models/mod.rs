pub mod application;
pub mod ranking;
pub mod user;
