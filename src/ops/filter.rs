use std::sync::Arc;

use crate::{
  error::{catch_panic, Error},
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
};

impl<Item: Send + 'static> Observable<Item> {
  /// Emit only those items from an Observable that pass a predicate test.
  ///
  /// ```
  /// use std::sync::{Arc, Mutex};
  /// use rxlite::prelude::*;
  ///
  /// let coll = Arc::new(Mutex::new(vec![]));
  /// let c_coll = coll.clone();
  ///
  /// Observable::from_iter(0..10)
  ///   .filter(|v| *v % 2 == 0)
  ///   .subscribe_next(move |v| c_coll.lock().unwrap().push(v));
  ///
  /// // only even numbers received.
  /// assert_eq!(*coll.lock().unwrap(), vec![0, 2, 4, 6, 8]);
  /// ```
  pub fn filter<F>(self, predicate: F) -> Observable<Item>
  where
    F: Fn(&Item) -> bool + Send + Sync + 'static,
  {
    self.try_filter(move |v| Ok(predicate(v)))
  }

  /// Like [`filter`](Observable::filter), but the predicate may fail by
  /// returning `Err`, which terminates the stream with that error.
  pub fn try_filter<F>(self, predicate: F) -> Observable<Item>
  where
    F: Fn(&Item) -> Result<bool, Error> + Send + Sync + 'static,
  {
    let predicate = Arc::new(predicate);
    Observable::create(move |observer| {
      self.subscribe(FilterObserver { observer, predicate: predicate.clone() });
      Ok(())
    })
  }
}

pub struct FilterObserver<Item, F> {
  observer: Subscriber<Item>,
  predicate: Arc<F>,
}

impl<Item, F> Observer<Item> for FilterObserver<Item, F>
where
  F: Fn(&Item) -> Result<bool, Error>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_closed() {
      return;
    }
    match catch_panic(|| (self.predicate)(&value)).and_then(|r| r) {
      Ok(true) => self.observer.next(value),
      Ok(false) => {}
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

#[cfg(test)]
mod test {
  use crate::{
    prelude::*,
    test_util::{recorder, Event},
  };

  #[test]
  fn keeps_matching_values_in_order() {
    let (observer, recording) = recorder();
    Observable::from_iter(0..10)
      .filter(|v| v % 3 == 0)
      .subscribe(observer);

    assert_eq!(recording.values(), vec![0, 3, 6, 9]);
    assert_eq!(recording.terminal_count(), 1);
  }

  #[test]
  fn runtime_error() {
    let (observer, recording) = recorder();
    Observable::range(1, 3)
      .try_filter(|_| Err(Error::msg("runtime error")))
      .subscribe(observer);

    assert_eq!(recording.events(), vec![Event::Error("runtime error".into())]);
  }

  #[test]
  fn panicking_predicate_is_an_error() {
    let (observer, recording) = recorder();
    Observable::range(1, 3)
      .filter(|v| if *v == 2 { panic!("bad predicate") } else { true })
      .subscribe(observer);

    assert_eq!(
      recording.events(),
      vec![Event::Next(1), Event::Error("panicked: bad predicate".into())]
    );
  }

  #[test]
  fn pass_error() {
    let (observer, recording) = recorder::<i32>();
    Observable::throw(Error::msg("upstream"))
      .filter(|_: &i32| true)
      .subscribe(observer);

    assert_eq!(recording.events(), vec![Event::Error("upstream".into())]);
  }
}
