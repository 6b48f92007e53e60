//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::Error,
  observable::Observable,
  observer::{BoxedObserver, DynObserver, FnMutObserver, Observer, ObserverAll},
  scheduler::{
    ImmediateScheduler, NewThreadScheduler, Scheduler, Schedulers, SharedScheduler, Task,
    ThreadPoolBuilder, ThreadPoolScheduler,
  },
  subscriber::{SafeObserver, Subscriber},
  subscription::{Disposable, DisposeGuard, Subscription},
};
