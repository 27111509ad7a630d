//! Faultline in-process event infrastructure.
//!
//! Provides [`EventBus`], the publish/subscribe hub the API server uses
//! to decouple write handlers from the WebSocket push task, and
//! [`DomainEvent`], the canonical event envelope. Durable state (action
//! log rows, notification rows) is always committed by the handler
//! *before* an event is published, so subscribers never carry data the
//! store cannot reconstruct.

pub mod bus;

pub use bus::{DomainEvent, EventBus};
