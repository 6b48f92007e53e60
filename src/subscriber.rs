//! Termination-safety wrapper around a raw observer.
//!
//! Every call to `Observable::subscribe` wraps the given observer in one
//! [`SafeObserver`]. Subscription procedures drive it through a cloneable
//! [`Subscriber`] handle, possibly from several threads at once.
//!
//! The wrapper owns a single `closed` flag meaning "terminated or disposed".
//! Terminal signals claim it with a compare-exchange, so only the first of
//! several racing `error`/`complete` calls is delivered. `next` calls are
//! serialized by the mutex around the observer because [`Observer::next`]
//! takes `&mut self`.
//!
//! A claimed terminal is parked in `pending` and handed over by whoever can
//! take the observer lock without waiting. Whoever releases the observer lock
//! checks `pending` afterwards, so a terminal raised from inside a `next`
//! callback is delivered as soon as that callback returns.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, TryLockError,
  },
};

use tracing::{debug, warn};

use crate::{
  error::{catch_panic, Error},
  observer::{BoxedObserver, Observer},
  subscription::Disposable,
};

enum Terminal {
  Error(Error),
  Complete,
}

pub struct SafeObserver<Item> {
  closed: AtomicBool,
  observer: Mutex<Option<BoxedObserver<Item>>>,
  pending: Mutex<Option<Terminal>>,
}

impl<Item> SafeObserver<Item> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item> + Send + 'static,
  {
    SafeObserver {
      closed: AtomicBool::new(false),
      observer: Mutex::new(Some(Box::new(observer))),
      pending: Mutex::new(None),
    }
  }

  pub fn next(&self, value: Item) {
    if self.is_closed() {
      return;
    }
    let mut guard = lock(&self.observer);
    // Checked again: a dispose may have landed while waiting for the lock.
    if !self.is_closed() {
      if let Some(observer) = guard.as_mut() {
        if let Err(err) = catch_panic(|| observer.next(value)) {
          debug!(%err, "observer panicked in next, terminating subscription");
          self.terminate(Terminal::Error(err));
        }
      }
    }
    drop(guard);
    self.flush();
  }

  pub fn error(&self, err: Error) {
    self.terminate(Terminal::Error(err));
    self.flush();
  }

  pub fn complete(&self) {
    self.terminate(Terminal::Complete);
    self.flush();
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }

  /// Parks `terminal` if this call is the first to terminate.
  fn terminate(&self, terminal: Terminal) {
    let claimed = self
      .closed
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok();
    if claimed {
      *lock(&self.pending) = Some(terminal);
    }
  }

  /// Delivers the parked terminal unless another call holds the observer; that
  /// call flushes once it lets go.
  fn flush(&self) {
    let mut pending = lock(&self.pending);
    if pending.is_none() {
      return;
    }
    let observer = match self.observer.try_lock() {
      Ok(mut guard) => guard.take(),
      Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
      Err(TryLockError::WouldBlock) => return,
    };
    let terminal = pending.take();
    drop(pending);
    if let (Some(observer), Some(terminal)) = (observer, terminal) {
      let delivered = catch_panic(|| match terminal {
        Terminal::Error(err) => observer.error(err),
        Terminal::Complete => observer.complete(),
      });
      if let Err(err) = delivered {
        warn!(%err, "observer panicked while handling a terminal signal");
      }
    }
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<Item> Disposable for SafeObserver<Item> {
  /// Only flips the flag. The observer itself is released with the last
  /// handle, so disposing from inside `next` cannot deadlock.
  #[inline]
  fn dispose(&self) { self.closed.store(true, Ordering::Release) }

  #[inline]
  fn is_disposed(&self) -> bool { self.is_closed() }
}

impl<Item> Debug for SafeObserver<Item> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SafeObserver")
      .field("closed", &self.is_closed())
      .finish()
  }
}

/// Shared handle to a [`SafeObserver`], handed to subscription procedures.
///
/// Every method takes `&self`, so a producer may keep calling through the
/// same handle after a terminal signal; those calls are dropped.
pub struct Subscriber<Item>(Arc<SafeObserver<Item>>);

impl<Item> Subscriber<Item> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item> + Send + 'static,
  {
    Subscriber(Arc::new(SafeObserver::new(observer)))
  }

  #[inline]
  pub fn next(&self, value: Item) { self.0.next(value) }

  #[inline]
  pub fn error(&self, err: Error) { self.0.error(err) }

  #[inline]
  pub fn complete(&self) { self.0.complete() }

  /// `true` once the subscription has terminated or been disposed. Producers
  /// may poll it to stop early.
  #[inline]
  pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<Item> Clone for Subscriber<Item> {
  #[inline]
  fn clone(&self) -> Self { Subscriber(self.0.clone()) }
}

impl<Item> Debug for Subscriber<Item> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Subscriber").field(&self.0).finish()
  }
}

impl<Item> Disposable for Subscriber<Item> {
  #[inline]
  fn dispose(&self) { self.0.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}
