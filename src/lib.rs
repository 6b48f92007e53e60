//! # rxlite: a small push-based reactive stream engine
//!
//! A value source is described once as an [`Observable`] and then reshaped
//! with chained operators. Schedulers decide on which threads the producer
//! and the downstream stages run.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::mpsc;
//!
//! use rxlite::prelude::*;
//!
//! let (tx, rx) = mpsc::channel();
//! Observable::range(1, 4)
//!   .subscribe_on(rxlite::scheduler::io())
//!   .observe_on(rxlite::scheduler::computation())
//!   .map(|v| v * 100)
//!   .filter(|v| *v != 300)
//!   .flat_map(|v| Observable::from_iter(vec![format!("Value: {}", v), format!("Double: {}", v * 2)]))
//!   .observe_on(rxlite::scheduler::single())
//!   .subscribe_all(|line| println!("{}", line), |err| eprintln!("{}", err), move || {
//!     tx.send(()).unwrap();
//!   });
//! rx.recv().unwrap();
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Immutable, cloneable description of a source plus its operators |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` signals |
//! | [`Subscriber`] | Termination-safe handle given to subscription procedures |
//! | [`Subscription`] | Handle to stop delivery to an active subscription |
//! | [`Scheduler`] | Runs units of work on some thread |
//!
//! ## Executors
//!
//! Bounded pools run on `futures::executor::ThreadPool`, the unbounded pool on
//! the blocking pool of a tokio runtime. Both `futures::executor::ThreadPool`
//! and `tokio::runtime::Handle` implement [`Scheduler`] directly.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;

#[cfg(test)]
mod test_util;

pub use prelude::*;
