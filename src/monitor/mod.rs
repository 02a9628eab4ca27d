// src/monitor/mod.rs

//! Watchlist evaluation.
//!
//! - [`evaluator`] owns the explicit watchlist and walks the tree below it
//!   once per cycle.
//! - [`dispatch`] holds the bounded queue and the single consumer task that
//!   turns dispatched file metadata into versioned copies.
//!
//! The consumer is the only writer of the change cache, so change decisions
//! are totally ordered by dispatch order.

pub mod dispatch;
pub mod evaluator;

pub use dispatch::DEFAULT_QUEUE_CAPACITY;
pub use evaluator::Monitor;
