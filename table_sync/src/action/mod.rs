//! Acting on the table: nonce tracking and action dispatch.

pub mod dispatcher;
pub mod nonce;

pub use dispatcher::{ActionDispatcher, DispatchOutcome};
pub use nonce::NonceManager;
