//! Keeping a table in sync: the poll loop, timers and the session that
//! owns them.
//!
//! ## Architecture
//!
//! A [`TableSession`] owns one [`Scheduler`]. The scheduler runs the
//! [`Poller`] every few seconds, the nonce refresh while an identity is
//! known, one-shot post-action nonce refreshes, and the task that
//! recomputes derived state whenever the snapshot store accepts a new
//! snapshot. Teardown aborts all of them and closes the store.

pub mod poller;
pub mod scheduler;
pub mod session;

pub use poller::{PollOutcome, Poller};
pub use scheduler::Scheduler;
pub use session::TableSession;
