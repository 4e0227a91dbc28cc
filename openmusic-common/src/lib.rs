//! # OpenMusic Common Library
//!
//! Shared code for the OpenMusic catalog service:
//! - Error taxonomy shared by stores, services and the HTTP layer
//! - Entity id generation
//! - Configuration loading
//! - Gateway identity signatures
//! - SQLite database initialization

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;

pub use error::{Error, Result};
