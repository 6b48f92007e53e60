//! Execution contexts.
//!
//! A [`Scheduler`] accepts a unit of work and runs it, on the calling thread
//! or on another one depending on the implementation. It never blocks the
//! caller and never panics; a panic inside a task is contained by the
//! scheduler running it. A scheduler that has been shut down refuses work
//! with [`Error::Rejected`](crate::error::Error::Rejected), which operators
//! turn into an `error` signal.
//!
//! Three process-wide pools are available through [`io`], [`computation`] and
//! [`single`]. They are created on first use and live as long as the process.
//! Code that needs deterministic teardown builds its own [`Schedulers`] and
//! shuts it down explicitly.

use std::sync::Arc;

use crate::error::Error;

mod immediate_scheduler;
mod schedulers;
mod thread_pool_scheduler;
mod thread_scheduler;

pub use immediate_scheduler::ImmediateScheduler;
pub use schedulers::{computation, io, single, Schedulers};
pub use thread_pool_scheduler::{ThreadPoolBuilder, ThreadPoolScheduler, DEFAULT_KEEP_ALIVE};
pub use thread_scheduler::NewThreadScheduler;

/// A zero-argument unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A Scheduler is an object to order tasks and schedule their execution.
pub trait Scheduler {
  /// Hands `task` over for execution. `Err` means it was dropped unrun.
  fn execute(&self, task: Task) -> Result<(), Error>;
}

/// Type-erased scheduler that can be shared between pipelines.
pub type SharedScheduler = Arc<dyn Scheduler + Send + Sync>;

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn execute(&self, task: Task) -> Result<(), Error> { (**self).execute(task) }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
  #[inline]
  fn execute(&self, task: Task) -> Result<(), Error> { (**self).execute(task) }
}

impl Scheduler for futures::executor::ThreadPool {
  fn execute(&self, task: Task) -> Result<(), Error> {
    self.spawn_ok(futures::future::lazy(move |_| task()));
    Ok(())
  }
}

impl Scheduler for tokio::runtime::Handle {
  /// Tasks may block, so they go to the blocking pool rather than onto the
  /// async workers.
  fn execute(&self, task: Task) -> Result<(), Error> {
    drop(self.spawn_blocking(task));
    Ok(())
  }
}
