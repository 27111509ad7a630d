//! Authentication building blocks.
//!
//! Token *issuance* lives in the upstream identity service; this crate
//! only validates bearer tokens and extracts the calling user.

pub mod jwt;
