//! Freesia Trigger
//!
//! The entry boundary of the pipeline. A trigger payload is validated,
//! recorded, and dispatched as a background execution; the caller gets an
//! acknowledgement with the execution id and observes the outcome through
//! the store.

mod error;
mod receiver;
mod types;

pub use error::TriggerError;
pub use receiver::TriggerReceiver;
pub use types::{TriggerResponse, TriggerStatus};
