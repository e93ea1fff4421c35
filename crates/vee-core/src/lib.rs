//! Core domain + application logic for the Vee community bot.
//!
//! This crate is intentionally framework-agnostic. The chat platform lives
//! behind the `PlatformGateway` port implemented in adapter crates.

pub mod activity;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod permissions;
pub mod persistence;
pub mod presence;
pub mod state;
pub mod status;
pub mod utils;

pub use errors::{Error, Result};
