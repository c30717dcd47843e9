//! Video generation: long-running provider jobs.
//!
//! A job is submitted once and then observed through its provider-issued
//! task id. [`prober`] performs single status queries, [`poller`] repeats
//! them under a `(max_wait, interval)` budget, and [`gateway`] exposes the
//! submit / submit-and-wait / query operations used by the HTTP routes.
//!
//! Nothing here is stored locally; the task id is the only handle and it is
//! echoed in every reply so callers can always fall back to polling.

pub mod gateway;
pub mod outcome;
pub mod poller;
pub mod prober;
pub mod state;

pub use gateway::{VideoGateway, VideoReply};
pub use outcome::PollOutcome;
pub use poller::PollBudget;
pub use state::TaskState;
