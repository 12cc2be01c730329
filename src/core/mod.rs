pub mod config;
pub mod errors;
pub mod models;

pub use config::{AppPaths, default_paths};
pub use errors::{AppError, AppResult};
