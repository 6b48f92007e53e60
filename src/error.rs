//! The error carried by the `error` signal.
//!
//! Every failure a pipeline can observe ends up as an [`Error`]: a producer
//! returning `Err` or panicking, an operator closure failing, or a downstream
//! observer panicking inside `next`.

use std::{
  any::Any,
  panic::{self, AssertUnwindSafe},
  sync::Arc,
};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
  /// A closure panicked; holds the rendered panic payload.
  #[error("panicked: {0}")]
  Panic(String),

  #[error("{0}")]
  Message(String),

  /// A scheduler refused a task because it was shut down.
  #[error("task rejected: {0} is shut down")]
  Rejected(String),

  /// A user error wrapped with [`Error::new`].
  #[error(transparent)]
  Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn new<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Source(Arc::new(err))
  }

  pub fn msg(msg: impl Into<String>) -> Self { Error::Message(msg.into()) }

  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "unknown panic".to_owned()
    };
    Error::Panic(msg)
  }

  pub fn is_panic(&self) -> bool { matches!(self, Error::Panic(_)) }

  pub fn is_rejected(&self) -> bool { matches!(self, Error::Rejected(_)) }
}

impl From<&str> for Error {
  fn from(msg: &str) -> Self { Error::msg(msg) }
}

impl From<String> for Error {
  fn from(msg: String) -> Self { Error::Message(msg) }
}

/// Runs `f`, turning a panic into [`Error::Panic`].
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, Error> {
  panic::catch_unwind(AssertUnwindSafe(f)).map_err(Error::from_panic)
}
