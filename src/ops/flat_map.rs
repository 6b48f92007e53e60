//! Merge operator.
//!
//! Every upstream value is turned into an inner Observable that is subscribed
//! right away; all inner values flow into the same downstream subscriber in
//! whatever order they arrive.
//!
//! Completion is tracked by an outstanding counter that starts at one for the
//! outer stream. Each inner subscription adds one, each inner completion and
//! the outer completion remove one, and the merged stream completes when the
//! counter reaches zero. Errors are not counted: the first one from any
//! stream terminates the merged stream at once.

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{
  error::{catch_panic, Error},
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
};

impl<Item: Send + 'static> Observable<Item> {
  /// Maps each value to an Observable and merges all of them into one
  /// stream. Inner streams run concurrently without limit.
  pub fn flat_map<B, F>(self, f: F) -> Observable<B>
  where
    B: Send + 'static,
    F: Fn(Item) -> Observable<B> + Send + Sync + 'static,
  {
    self.try_flat_map(move |v| Ok(f(v)))
  }

  /// Like [`flat_map`](Observable::flat_map), but building the inner stream
  /// may fail by returning `Err`, which terminates the merged stream.
  pub fn try_flat_map<B, F>(self, f: F) -> Observable<B>
  where
    B: Send + 'static,
    F: Fn(Item) -> Result<Observable<B>, Error> + Send + Sync + 'static,
  {
    let func = Arc::new(f);
    Observable::create(move |observer| {
      self.subscribe(FlatMapObserver {
        observer,
        func: func.clone(),
        outstanding: Arc::new(AtomicUsize::new(1)),
      });
      Ok(())
    })
  }
}

pub struct FlatMapObserver<B, F> {
  observer: Subscriber<B>,
  func: Arc<F>,
  outstanding: Arc<AtomicUsize>,
}

impl<Item, B, F> Observer<Item> for FlatMapObserver<B, F>
where
  B: Send + 'static,
  F: Fn(Item) -> Result<Observable<B>, Error>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_closed() {
      return;
    }
    match catch_panic(|| (self.func)(value)).and_then(|r| r) {
      Ok(inner) => {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        inner.subscribe(FlatMapInnerObserver {
          observer: self.observer.clone(),
          outstanding: self.outstanding.clone(),
        });
      }
      Err(err) => self.observer.error(err),
    }
  }

  #[inline]
  fn error(self, err: Error) { self.observer.error(err) }

  fn complete(self) { release(&self.outstanding, &self.observer) }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct FlatMapInnerObserver<B> {
  observer: Subscriber<B>,
  outstanding: Arc<AtomicUsize>,
}

impl<B> Observer<B> for FlatMapInnerObserver<B> {
  #[inline]
  fn next(&mut self, value: B) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Error) { self.observer.error(err) }

  fn complete(self) { release(&self.outstanding, &self.observer) }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Drops one outstanding stream; the last one out completes downstream.
fn release<B>(outstanding: &AtomicUsize, observer: &Subscriber<B>) {
  if outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
    observer.complete();
  }
}
