//! Consumers of a stream.
//!
//! An [`Observer`] sees any number of `next` calls followed by at most one of
//! `error` or `complete`. The terminal methods take the observer by value, so
//! an implementation cannot be used again after it was told the stream ended.
//! Implementations do not need to be thread-safe: the `SafeObserver` wrapping
//! every subscription serializes calls and filters out anything arriving after
//! a terminal signal.

use tracing::warn;

use crate::error::Error;

pub trait Observer<Item> {
  /// Called once per value, never concurrently for the same observer.
  fn next(&mut self, value: Item);

  /// The stream failed; nothing follows.
  fn error(self, err: Error);

  /// The stream ended normally; nothing follows.
  fn complete(self);

  /// Whether values sent now would be discarded. Operators check it to skip
  /// their own work.
  fn is_closed(&self) -> bool;
}

/// Object-safe mirror of [`Observer`] with boxed receivers for the terminal
/// methods, used to store observers of different types behind one pointer.
pub trait DynObserver<Item> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Error);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item> DynObserver<Item> for T
where
  T: Observer<Item>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Error) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed observer that can be moved across threads.
pub type BoxedObserver<Item> = Box<dyn DynObserver<Item> + Send>;

impl<Item> Observer<Item> for BoxedObserver<Item> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Error) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

/// Adapts a closure into an Observer that only handles values.
///
/// Completion is ignored. An error reaching this observer has nowhere to go,
/// so it is logged.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  fn error(self, err: Error) {
    warn!(%err, "error reached an observer without an error handler");
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// One closure per signal; used by `Observable::subscribe_all`.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  #[inline]
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, N, E, C> Observer<Item> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Error),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(self, err: Error) { (self.error)(err); }

  #[inline]
  fn complete(self) { (self.complete)(); }

  #[inline]
  fn is_closed(&self) -> bool { false }
}
