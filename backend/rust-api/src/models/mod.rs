pub mod chat;
pub mod course;
pub mod problem;
pub mod solved;
pub mod user;
