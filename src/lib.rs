pub mod models;
pub mod platform;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod utils;
