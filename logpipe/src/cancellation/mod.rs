//! Cooperative cancellation of pipeline executions.
//!
//! Each execution owns a [`CancellationToken`]. The watchdog cancels it when
//! the execution expires; processors observe it through their
//! [`ProcessContext`](crate::processor::ProcessContext).

mod token;

pub use token::CancellationToken;
