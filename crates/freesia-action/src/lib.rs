//! Freesia Action
//!
//! Adapter to the lightweight downstream function the invoke branch calls.
//! The [`ActionInvoker`] trait is a single synchronous request/response
//! operation: JSON payload in, the response's nested `payload` field out.
//!
//! [`HttpActionInvoker`] POSTs payloads to a configured endpoint;
//! [`GreetingAction`] is the in-process demo used when no endpoint is
//! configured.

mod error;
mod http;
mod invoker;
mod local;

pub use error::ActionError;
pub use http::HttpActionInvoker;
pub use invoker::{ActionInvoker, narrow_response};
pub use local::GreetingAction;
