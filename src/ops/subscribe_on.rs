use std::sync::Arc;

use crate::{observable::Observable, scheduler::Scheduler};

impl<Item: Send + 'static> Observable<Item> {
  /// Runs the subscription to the upstream, and therefore its producer, as a
  /// task on `scheduler` instead of on the subscribing thread.
  ///
  /// Where downstream operators run is unaffected unless `observe_on` is used
  /// as well. Each application wraps the previous subscription call in its
  /// own task, so with several `subscribe_on` in one chain the producer ends
  /// up on the scheduler closest to it. If `scheduler` rejects the task the
  /// subscriber receives that rejection as its `error`.
  pub fn subscribe_on<SD>(self, scheduler: SD) -> Observable<Item>
  where
    SD: Scheduler + Send + Sync + 'static,
  {
    let scheduler = Arc::new(scheduler);
    Observable::create(move |observer| {
      let source = self.clone();
      scheduler.execute(Box::new(move || source.subscribe_with(observer)))
    })
  }
}
