pub mod client;
pub mod db;
pub mod enrollment;
pub mod errors;
pub mod health_program;
pub mod token;
pub mod user;
