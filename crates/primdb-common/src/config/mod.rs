//! Configuration for primdb.
//!
//! This module provides configuration structures for database components.

mod database;

pub use database::DatabaseConfig;
