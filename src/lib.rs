pub mod analytics;
pub mod config;
pub mod core;
pub mod error;
pub mod journal;
pub mod models;
#[cfg(test)]
pub mod test_helpers;
