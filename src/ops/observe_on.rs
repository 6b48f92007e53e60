use std::sync::Arc;

use crate::{
  error::Error, observable::Observable, observer::Observer, scheduler::Scheduler,
  subscriber::Subscriber,
};

impl<Item: Send + 'static> Observable<Item> {
  /// Delivers every signal to the downstream as a separate task on
  /// `scheduler`.
  ///
  /// Signals are handed to the scheduler in upstream order, but only a
  /// scheduler with a single FIFO worker (such as
  /// [`single`](crate::scheduler::single)) also runs them in that order. On a
  /// multi-worker pool values may be delivered out of order and a terminal
  /// signal may overtake values still queued; those values are then dropped.
  ///
  /// Once `scheduler` rejects a delivery the downstream receives the
  /// rejection as its `error`, on the upstream thread.
  pub fn observe_on<SD>(self, scheduler: SD) -> Observable<Item>
  where
    SD: Scheduler + Send + Sync + 'static,
  {
    let scheduler = Arc::new(scheduler);
    Observable::create(move |observer| {
      self.subscribe(ObserveOnObserver { observer, scheduler: scheduler.clone() });
      Ok(())
    })
  }
}

pub struct ObserveOnObserver<Item, SD> {
  observer: Subscriber<Item>,
  scheduler: Arc<SD>,
}

impl<Item, SD> Observer<Item> for ObserveOnObserver<Item, SD>
where
  Item: Send + 'static,
  SD: Scheduler,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_closed() {
      return;
    }
    let observer = self.observer.clone();
    if let Err(rejected) = self.scheduler.execute(Box::new(move || observer.next(value))) {
      self.observer.error(rejected);
    }
  }

  fn error(self, err: Error) {
    let observer = self.observer.clone();
    let delivered = err.clone();
    if self.scheduler.execute(Box::new(move || observer.error(delivered))).is_err() {
      // The upstream failure says more than the rejection does.
      self.observer.error(err);
    }
  }

  fn complete(self) {
    let observer = self.observer.clone();
    if let Err(rejected) = self.scheduler.execute(Box::new(move || observer.complete())) {
      self.observer.error(rejected);
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
