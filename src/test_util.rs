//! Recording observer shared by the unit tests.

use std::{
  sync::{mpsc, Arc, Mutex},
  time::Duration,
};

use crate::{error::Error, observer::Observer};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event<T> {
  Next(T),
  Error(String),
  Complete,
}

impl<T> Event<T> {
  pub(crate) fn is_terminal(&self) -> bool { !matches!(self, Event::Next(_)) }
}

pub(crate) struct Recorder<T> {
  events: Arc<Mutex<Vec<Event<T>>>>,
  done: mpsc::Sender<()>,
  panic_on: Option<T>,
}

impl<T: PartialEq> Recorder<T> {
  /// Makes `next` panic when it receives `value`.
  pub(crate) fn panic_on(&mut self, value: T) { self.panic_on = Some(value); }
}

pub(crate) struct Recording<T> {
  events: Arc<Mutex<Vec<Event<T>>>>,
  done: mpsc::Receiver<()>,
}

pub(crate) fn recorder<T>() -> (Recorder<T>, Recording<T>) {
  let events = Arc::new(Mutex::new(vec![]));
  let (tx, rx) = mpsc::channel();
  (
    Recorder { events: events.clone(), done: tx, panic_on: None },
    Recording { events, done: rx },
  )
}

impl<T: Clone> Recording<T> {
  pub(crate) fn events(&self) -> Vec<Event<T>> { self.events.lock().unwrap().clone() }

  pub(crate) fn values(&self) -> Vec<T> {
    self
      .events()
      .into_iter()
      .filter_map(|e| match e {
        Event::Next(v) => Some(v),
        _ => None,
      })
      .collect()
  }

  pub(crate) fn terminal_count(&self) -> usize {
    self.events().iter().filter(|e| e.is_terminal()).count()
  }

  /// Blocks until a terminal signal arrives; `false` on timeout.
  pub(crate) fn wait(&self) -> bool { self.done.recv_timeout(Duration::from_secs(5)).is_ok() }
}

impl<T: PartialEq> Observer<T> for Recorder<T> {
  fn next(&mut self, value: T) {
    if self.panic_on.as_ref() == Some(&value) {
      panic!("observer rejected value");
    }
    self.events.lock().unwrap().push(Event::Next(value));
  }

  fn error(self, err: Error) {
    self.events.lock().unwrap().push(Event::Error(err.to_string()));
    let _ = self.done.send(());
  }

  fn complete(self) {
    self.events.lock().unwrap().push(Event::Complete);
    let _ = self.done.send(());
  }

  fn is_closed(&self) -> bool { false }
}
