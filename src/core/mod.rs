//! Platform-independent pipeline pieces: time windows, aggregation, settings.

pub mod access;
pub mod aggregate;
pub mod config;
pub mod models;
pub mod snowflake;
pub mod window;
