use std::thread;

use tracing::error;

use super::{Scheduler, Task};
use crate::error::{catch_panic, Error};

/// Starts a new thread for each unit of work.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewThreadScheduler;

impl Scheduler for NewThreadScheduler {
  fn execute(&self, task: Task) -> Result<(), Error> {
    thread::Builder::new()
      .name("rx-new-thread".to_owned())
      .spawn(move || {
        if let Err(err) = catch_panic(task) {
          error!(%err, "task panicked");
        }
      })
      .map(drop)
      .map_err(|err| {
        error!(%err, "failed to spawn thread, task dropped");
        Error::new(err)
      })
  }
}

#[cfg(test)]
mod test {
  use std::{sync::mpsc, time::Duration};

  use super::*;

  #[test]
  fn runs_on_another_thread() {
    let (tx, rx) = mpsc::channel();
    NewThreadScheduler
      .execute(Box::new(move || tx.send(thread::current().id()).unwrap()))
      .unwrap();
    let id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(id, thread::current().id());
  }
}
