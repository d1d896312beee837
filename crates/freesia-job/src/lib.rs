//! Freesia Job
//!
//! Adapter to the batch job system the pipeline submits work to. The
//! [`JobRunner`] trait covers the three operations the executor needs:
//! submit a run, wait for it to finish under a deadline, and request
//! best-effort cancellation.
//!
//! [`LocalJobRunner`] is the in-process implementation: it runs registered
//! [`Job`]s on spawned tasks and reports their lifecycle through per-run
//! watch channels, so waits are event-driven rather than polled. [`EchoJob`]
//! is the demo job the default pipeline submits.

mod echo;
mod error;
mod local;
mod runner;
mod types;

pub use echo::EchoJob;
pub use error::JobError;
pub use local::{Job, LocalJobRunner};
pub use runner::JobRunner;
pub use types::{JobRequest, JobRun, JobRunHandle, JobStatus};
