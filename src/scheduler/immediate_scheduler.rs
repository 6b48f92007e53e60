use tracing::error;

use super::{Scheduler, Task};
use crate::error::{catch_panic, Error};

/// Runs every task right away on the calling thread.
///
/// Useful to keep a pipeline synchronous in tests while still going through
/// `subscribe_on`/`observe_on`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn execute(&self, task: Task) -> Result<(), Error> {
    if let Err(err) = catch_panic(task) {
      error!(%err, "task panicked");
    }
    Ok(())
  }
}
