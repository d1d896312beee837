//! Freesia Workflow
//!
//! Domain types for the freesia orchestration pipeline: the invocation
//! request accepted at the trigger boundary, the execution status enum, the
//! step state machine with its pure transition function, and the branch
//! condition.
//!
//! Nothing in this crate performs I/O. Drivers (the executor crate) perform
//! the effect each step calls for and feed the observed outcome back through
//! [`advance`], so the whole machine is testable without any external system.

mod condition;
mod error;
mod request;
mod status;
mod step;

pub use condition::{OVERRIDE_FIELD, should_invoke};
pub use error::{ConditionError, TransitionError, ValidationError};
pub use request::InvocationRequest;
pub use status::ExecutionStatus;
pub use step::{Step, StepEvent, advance};
