//! # Backoffice Shared Library
//!
//! This crate contains the types, persistence and business rules shared by
//! the back-office API server and its clients.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens and request authentication
//! - `db`: Connection pool, migrations and first-run seeding
//! - `models`: Users and the singleton store settings row
//! - `listing`: Server-driven list contract (params, page envelope, query builder)
//! - `table`: Headless data table controller that drives list endpoints
//! - `forms`: Validated input forms shared by server and client
//! - `flash`: One-shot flash messages attached to action responses
//! - `storage`: File storage backend and image upload rules

pub mod auth;
pub mod db;
pub mod flash;
pub mod forms;
pub mod listing;
pub mod models;
pub mod storage;
pub mod table;

/// Current version of the backoffice shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
