//! # WKMP Common Library
//!
//! Shared code for WKMP modules including:
//! - Common error type
//! - Configuration loading (TOML) and config file resolution
//! - Logging initialisation
//! - Event types (ExploreEvent) and the EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
