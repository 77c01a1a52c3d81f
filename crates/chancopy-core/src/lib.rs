//! Core domain + application logic for the channel post range copier.
//!
//! This crate is intentionally framework-agnostic. The Telegram client, the
//! ffmpeg tools and the notifier live behind ports (traits) implemented in
//! adapter crates.

pub mod classify;
pub mod config;
pub mod copier;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod normalize;
pub mod ports;
pub mod tempfiles;

pub use errors::{Error, Result};
