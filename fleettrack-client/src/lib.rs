pub mod configs;
pub mod errors;
pub mod services;
