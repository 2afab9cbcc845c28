pub mod application;
pub mod candidate;
pub mod client;
pub mod email;
pub mod interview;
pub mod job;
pub mod status;
pub mod user;
