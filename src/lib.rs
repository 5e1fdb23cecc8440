pub mod config;
pub mod controller;
pub mod entities;
pub mod error;
pub mod locate;
pub mod map;
pub mod service;
pub mod utils;

pub use config::Config;
pub use controller::MapController;
pub use error::{AppError, AppResult};
