use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

/// Cancellation handle returned from subscribing.
///
/// Disposing only stops delivery to the observer behind the handle; the
/// producer keeps running until it finishes on its own.
pub trait Disposable {
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// Type-erased [`Disposable`] returned by `Observable::subscribe`.
#[derive(Clone)]
pub struct Subscription(Arc<dyn Disposable + Send + Sync>);

impl Subscription {
  pub fn new(disposable: impl Disposable + Send + Sync + 'static) -> Self {
    Subscription(Arc::new(disposable))
  }
}

impl Disposable for Subscription {
  #[inline]
  fn dispose(&self) { self.0.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_disposed", &self.is_disposed())
      .finish()
  }
}

/// Disposes the wrapped handle when dropped.
#[derive(Debug)]
#[must_use]
pub struct DisposeGuard<T: Disposable>(pub(crate) T);

impl<T: Disposable> Drop for DisposeGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.dispose() }
}

impl Subscription {
  /// Activates "RAII" behavior for this subscription: `dispose()` is called
  /// as soon as the returned guard goes out of scope.
  pub fn dispose_when_dropped(self) -> DisposeGuard<Self> { DisposeGuard(self) }
}
