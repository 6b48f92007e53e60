use std::sync::Arc;

use crate::{
  error::{catch_panic, Error},
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
};

impl<Item: Send + 'static> Observable<Item> {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  ///
  /// A panic inside `f` terminates the stream with an error.
  pub fn map<B, F>(self, f: F) -> Observable<B>
  where
    B: Send + 'static,
    F: Fn(Item) -> B + Send + Sync + 'static,
  {
    self.try_map(move |v| Ok(f(v)))
  }

  /// Like [`map`](Observable::map), but `f` may fail by returning `Err`, which
  /// is forwarded as the stream's error.
  pub fn try_map<B, F>(self, f: F) -> Observable<B>
  where
    B: Send + 'static,
    F: Fn(Item) -> Result<B, Error> + Send + Sync + 'static,
  {
    let func = Arc::new(f);
    Observable::create(move |observer| {
      self.subscribe(MapObserver { observer, func: func.clone() });
      Ok(())
    })
  }
}

pub struct MapObserver<B, F> {
  observer: Subscriber<B>,
  func: Arc<F>,
}

impl<Item, B, F> Observer<Item> for MapObserver<B, F>
where
  F: Fn(Item) -> Result<B, Error>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_closed() {
      return;
    }
    match catch_panic(|| (self.func)(value)).and_then(|r| r) {
      Ok(v) => self.observer.next(v),
      Err(err) => self.observer.error(err),
    }
  }

  #[inline]
  fn error(self, err: Error) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
