use std::{num::NonZeroUsize, thread};

use once_cell::sync::Lazy;
use tracing::error;

use super::ThreadPoolScheduler;
use crate::error::Error;

static IO: Lazy<ThreadPoolScheduler> = Lazy::new(|| global("rx-io", new_io));
static COMPUTATION: Lazy<ThreadPoolScheduler> =
  Lazy::new(|| global("rx-computation", new_computation));
static SINGLE: Lazy<ThreadPoolScheduler> = Lazy::new(|| global("rx-single", new_single));

/// Process-wide unbounded pool for blocking work.
///
/// Created on first use and never shut down.
pub fn io() -> ThreadPoolScheduler { IO.clone() }

/// Process-wide pool with one worker per available hardware thread.
///
/// Created on first use and never shut down.
pub fn computation() -> ThreadPoolScheduler { COMPUTATION.clone() }

/// Process-wide single worker; tasks run one at a time in submission order.
///
/// Created on first use and never shut down.
pub fn single() -> ThreadPoolScheduler { SINGLE.clone() }

/// A global that failed to start rejects its tasks, so pipelines using it
/// terminate with an error.
fn global(
  name: &str,
  build: fn(&str) -> Result<ThreadPoolScheduler, Error>,
) -> ThreadPoolScheduler {
  build(name).unwrap_or_else(|err| {
    error!(pool = name, %err, "failed to start scheduler");
    ThreadPoolScheduler::unavailable(name)
  })
}

fn parallelism() -> usize { thread::available_parallelism().map_or(1, NonZeroUsize::get) }

fn new_io(name: &str) -> Result<ThreadPoolScheduler, Error> {
  ThreadPoolScheduler::builder()
    .name(name)
    .keep_alive(super::DEFAULT_KEEP_ALIVE)
    .build()
}

fn new_computation(name: &str) -> Result<ThreadPoolScheduler, Error> {
  ThreadPoolScheduler::builder().name(name).max_workers(parallelism()).build()
}

fn new_single(name: &str) -> Result<ThreadPoolScheduler, Error> {
  ThreadPoolScheduler::builder().name(name).max_workers(1).build()
}

/// An owned set of the three standard schedulers.
///
/// Unlike the process-wide accessors, a `Schedulers` value can be passed to
/// the pipelines that use it and shut down deterministically. Dropping it
/// shuts it down as well.
///
/// ```
/// use rxlite::prelude::*;
///
/// let schedulers = Schedulers::new().unwrap();
/// Observable::range(1, 3)
///   .subscribe_on(schedulers.io())
///   .observe_on(schedulers.single())
///   .subscribe_next(|v| println!("{}", v));
/// schedulers.shutdown();
/// ```
#[derive(Debug)]
pub struct Schedulers {
  io: ThreadPoolScheduler,
  computation: ThreadPoolScheduler,
  single: ThreadPoolScheduler,
}

impl Schedulers {
  pub fn new() -> Result<Self, Error> {
    Ok(Schedulers {
      io: new_io("io")?,
      computation: new_computation("computation")?,
      single: new_single("single")?,
    })
  }

  pub fn io(&self) -> ThreadPoolScheduler { self.io.clone() }

  pub fn computation(&self) -> ThreadPoolScheduler { self.computation.clone() }

  pub fn single(&self) -> ThreadPoolScheduler { self.single.clone() }

  /// Stops all three pools and waits for the work they accepted to finish.
  ///
  /// Pools are stopped from the producer side inwards, so work that `io`
  /// tasks hand to `computation` or `single` while draining still runs.
  /// Anything submitted after a pool stopped is rejected, and the pipeline
  /// that submitted it terminates with [`Error::Rejected`].
  pub fn shutdown(&self) {
    self.io.shutdown();
    self.computation.shutdown();
    self.single.shutdown();
  }
}

impl Drop for Schedulers {
  fn drop(&mut self) { self.shutdown(); }
}
