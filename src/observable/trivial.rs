use crate::{error::Error, observable::Observable};

impl<Item: Send + 'static> Observable<Item> {
  /// Creates an observable that produces no values and completes
  /// immediately.
  pub fn empty() -> Self {
    Observable::create(|subscriber| {
      subscriber.complete();
      Ok(())
    })
  }

  /// Creates an observable that never emits anything, not even a terminal
  /// signal.
  pub fn never() -> Self { Observable::create(|_| Ok(())) }

  /// Creates an observable that emits no items, just terminates with an
  /// error.
  pub fn throw(err: Error) -> Self {
    Observable::create(move |subscriber| {
      subscriber.error(err.clone());
      Ok(())
    })
  }
}
