//! Lead-Capture API Library
//!
//! Backend for the landing page contact form: validates JSON submissions,
//! enriches them with request-derived metadata, enforces a per-IP
//! trailing-window submission limit against the leads table, and persists
//! accepted leads to Postgres.
//!
//! # Modules
//!
//! - `analytics`: Server-side event capture client (idempotent init, fire-once).
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Lead storage operations (rate-window count, insert, fetch).
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Wire and database models.
//! - `request_meta`: Header and UTM query-parameter extraction.
//! - `validation`: Submission parsing and email validation.

pub mod analytics;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod request_meta;
pub mod validation;
