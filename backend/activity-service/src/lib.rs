pub mod config;
pub mod consumers;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod repository;
pub mod services;

pub use error::{ActivityError, ErrorKind, ErrorResponse};
