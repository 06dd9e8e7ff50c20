//! DailyUse Sync Server Library
//!
//! Per-user JSON document store that keeps named files in sync between
//! clients and this server using optimistic concurrency.
//!
//! # Modules
//!
//! - `db`: SQLite record store for documents
//! - `sync`: Version gate and timestamp-based sync resolver
//! - `service`: Validating façade used by the HTTP routes
//! - `routes`: axum routers

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod routes;
pub mod service;
pub mod state;
pub mod sync;
