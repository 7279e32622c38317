//! Core domain + application logic for the moderation relay bot.
//!
//! This crate is intentionally framework-agnostic. The messaging gateway
//! (Telegram today) lives behind a port (trait) implemented in the adapter
//! crate; the proposal lifecycle, persistence, and notification fan-out all
//! live here so they can be tested against doubles.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod notify;
pub mod proposal;
pub mod service;
pub mod store;

pub use errors::{Error, Result};
