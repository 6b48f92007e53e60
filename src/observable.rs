//! The composable source type.
//!
//! An [`Observable`] is an immutable value wrapping a subscription procedure:
//! a function that, given a [`Subscriber`], pushes zero or more values into
//! it followed by at most one terminal signal. Operators build a new
//! Observable whose procedure subscribes to the previous one, so a pipeline is
//! a persistent chain of closures with no shared mutable state.

use std::sync::Arc;

use tracing::debug;

use crate::{
  error::{catch_panic, Error},
  observer::{FnMutObserver, Observer, ObserverAll},
  subscriber::Subscriber,
  subscription::Subscription,
};

mod from_iter;
mod range;
mod trivial;

type Procedure<Item> = dyn Fn(Subscriber<Item>) -> Result<(), Error> + Send + Sync;

/// A push-based source of `Item` values.
///
/// Cloning is cheap; every call to [`subscribe`](Observable::subscribe) runs
/// the subscription procedure again for the new observer.
pub struct Observable<Item> {
  source: Arc<Procedure<Item>>,
}

impl<Item> Clone for Observable<Item> {
  #[inline]
  fn clone(&self) -> Self { Observable { source: self.source.clone() } }
}

impl<Item: Send + 'static> Observable<Item> {
  /// param `procedure`: the function that is called each time the Observable
  /// is subscribed to. It is given a [`Subscriber`], to which new values can
  /// be `next`ed, or an `error` method can be called to raise an error, or
  /// `complete` can be called to notify of a successful completion.
  ///
  /// Returning `Err` from the procedure, or panicking inside it, is
  /// equivalent to calling `error` on the subscriber.
  pub fn create<F>(procedure: F) -> Self
  where
    F: Fn(Subscriber<Item>) -> Result<(), Error> + Send + Sync + 'static,
  {
    Observable { source: Arc::new(procedure) }
  }

  /// Wraps `observer` in a fresh termination-safe subscriber and runs the
  /// subscription procedure with it.
  pub fn subscribe<O>(&self, observer: O) -> Subscription
  where
    O: Observer<Item> + Send + 'static,
  {
    let subscriber = Subscriber::new(observer);
    self.subscribe_with(subscriber.clone());
    Subscription::new(subscriber)
  }

  /// Subscribes with a closure that receives every value.
  pub fn subscribe_next<N>(&self, next: N) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
  {
    self.subscribe(FnMutObserver(next))
  }

  /// Subscribes with one handler per signal.
  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(Error) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe(ObserverAll::new(next, error, complete))
  }

  /// Runs the procedure against an existing subscriber. A producer failure is
  /// converted to `error`; the subscriber drops it if it already terminated.
  pub(crate) fn subscribe_with(&self, subscriber: Subscriber<Item>) {
    let result = catch_panic(|| (self.source)(subscriber.clone())).and_then(|r| r);
    if let Err(err) = result {
      debug!(%err, "subscription procedure failed");
      subscriber.error(err);
    }
  }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use crate::{
    prelude::*,
    test_util::{recorder, Event},
  };

  #[test]
  fn create_and_subscribe() {
    let (observer, recording) = recorder();
    Observable::<i32>::create(|s| {
      s.next(1);
      s.next(2);
      s.complete();
      Ok(())
    })
    .subscribe(observer);

    assert_eq!(recording.events(), vec![Event::Next(1), Event::Next(2), Event::Complete]);
  }

  #[test]
  fn signals_after_terminal_are_dropped() {
    let (observer, recording) = recorder();
    Observable::<i32>::create(|s| {
      s.next(1);
      s.next(2);
      s.next(3);
      s.complete();
      s.next(4);
      s.error(Error::msg("never dispatched"));
      s.complete();
      Ok(())
    })
    .subscribe(observer);

    assert_eq!(recording.values(), vec![1, 2, 3]);
    assert_eq!(recording.terminal_count(), 1);
    assert_eq!(recording.events().last(), Some(&Event::Complete));
  }

  #[test]
  fn returned_error_becomes_error_signal() {
    let (observer, recording) = recorder::<i32>();
    Observable::<i32>::create(|s| {
      s.next(1);
      Err(Error::msg("producer failed"))
    })
    .subscribe(observer);

    assert_eq!(recording.events(), vec![Event::Next(1), Event::Error("producer failed".into())]);
  }

  #[test]
  fn producer_panic_becomes_error_signal() {
    let (observer, recording) = recorder::<i32>();
    Observable::<i32>::create(|_s| panic!("producer bug")).subscribe(observer);

    assert_eq!(recording.events(), vec![Event::Error("panicked: producer bug".into())]);
  }

  #[test]
  fn failure_after_completion_is_suppressed() {
    let (observer, recording) = recorder::<i32>();
    Observable::<i32>::create(|s| {
      s.complete();
      Err(Error::msg("too late"))
    })
    .subscribe(observer);

    assert_eq!(recording.events(), vec![Event::Complete]);
  }

  #[test]
  fn every_subscribe_reruns_the_procedure() {
    let runs = Arc::new(AtomicUsize::new(0));
    let c_runs = runs.clone();
    let o = Observable::<i32>::create(move |s| {
      c_runs.fetch_add(1, Ordering::SeqCst);
      s.next(1);
      s.next(2);
      s.next(3);
      s.next(4);
      s.complete();
      Ok(())
    });
    let sum1 = Arc::new(Mutex::new(0));
    let sum2 = Arc::new(Mutex::new(0));
    let c_sum1 = sum1.clone();
    let c_sum2 = sum2.clone();
    o.subscribe_next(move |v| *c_sum1.lock().unwrap() += v);
    o.clone().subscribe_next(move |v| *c_sum2.lock().unwrap() += v);

    assert_eq!(*sum1.lock().unwrap(), 10);
    assert_eq!(*sum2.lock().unwrap(), 10);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn subscribe_all_routes_terminals() {
    let completed = Arc::new(AtomicUsize::new(0));
    let c_completed = completed.clone();
    let errors = Arc::new(AtomicUsize::new(0));
    let c_errors = errors.clone();
    Observable::range(0, 3).subscribe_all(
      |_| {},
      move |_| {
        c_errors.fetch_add(1, Ordering::SeqCst);
      },
      move || {
        c_completed.fetch_add(1, Ordering::SeqCst);
      },
    );

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn dispose_after_subscribe() {
    let subscription = Observable::range(1, 10).subscribe_next(|_| {});
    subscription.dispose();
    assert!(subscription.is_disposed());
  }
}
