//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Query-parameter structs where a listing supports filters

pub mod notification;
pub mod progress_request;
pub mod ticket;
pub mod ticket_action;
pub mod user;
