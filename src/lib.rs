pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod schedule;
pub mod store;
pub mod web;

pub use config::GenerationConfig;
pub use error::{Result, TimetableError};
