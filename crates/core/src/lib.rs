//! Domain types and pure logic for the faultline ticket backend.
//!
//! This crate has no internal dependencies so its contents can be used by
//! the repository layer, the API server, and any future worker or CLI
//! tooling alike. It holds the shared id/timestamp aliases, the domain
//! error enum, the closed status/action vocabularies, and the timeline
//! reconstruction algorithm that derives status durations and pause
//! intervals from a ticket's action log.

pub mod error;
pub mod notifications;
pub mod status;
pub mod timeline;
pub mod types;

pub use error::CoreError;
