//! Example: Hopping Threads
//!
//! The producer runs on the `io` pool, the `map`/`filter`/`flat_map` stages on
//! the `computation` pool and the final observer on the `single` worker. Every
//! line printed names the thread it came from.
//!
//! Run with `cargo run --example pipeline`.

use std::{sync::mpsc, thread, time::Duration};

use rxlite::{prelude::*, scheduler};

fn thread_name() -> String { thread::current().name().unwrap_or("unnamed").to_owned() }

fn main() {
  let source = Observable::<i32>::create(|observer| {
    for i in 1..=4 {
      thread::sleep(Duration::from_millis(100));
      println!("Emitting: {} (Thread: {})", i, thread_name());
      observer.next(i);
    }
    observer.complete();
    Ok(())
  });

  let (done, finished) = mpsc::channel();
  let failed = done.clone();
  source
    .subscribe_on(scheduler::io())
    .observe_on(scheduler::computation())
    .map(|i| i * 100)
    .filter(|i| *i != 30)
    .flat_map(|i| {
      Observable::create(move |obs| {
        obs.next(format!("Value: {}", i));
        obs.next(format!("Double Value: {}", i * 2));
        obs.complete();
        Ok(())
      })
    })
    .observe_on(scheduler::single())
    .subscribe_all(
      |item| println!("Received: {} (Thread: {})", item, thread_name()),
      move |err| {
        eprintln!("Error: {}", err);
        let _ = failed.send(());
      },
      move || {
        println!("Completed (Thread: {})", thread_name());
        let _ = done.send(());
      },
    );

  if finished.recv_timeout(Duration::from_secs(3)).is_err() {
    eprintln!("pipeline did not finish in time");
  }
}
