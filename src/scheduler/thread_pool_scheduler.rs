//! Pooled schedulers on top of the `futures` and `tokio` executors.
//!
//! A pool with a worker limit is a `futures::executor::ThreadPool` of that
//! size; each task is wrapped in a ready future. With one worker the pool
//! pulls tasks from a single channel, so they run strictly in submission
//! order. A pool without a limit runs tasks on the blocking pool of a private
//! tokio runtime, which reuses idle threads, starts new ones when none is
//! free and lets idle ones go after the keep-alive.
//!
//! Every accepted task is counted until it has run (or was dropped by the
//! executor), which is what `shutdown` waits on.

use std::{
  cell::Cell,
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Condvar, Mutex, MutexGuard, PoisonError,
  },
  time::Duration,
};

use futures::executor::ThreadPool;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, trace, warn};

use super::{Scheduler, Task};
use crate::error::{catch_panic, Error};

/// How long an idle worker of an unbounded pool waits for new work.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Thread cap of an unbounded pool; past it tasks queue.
const MAX_CACHED_WORKERS: usize = 10_000;

static NEXT_POOL_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
  /// Id of the pool that owns the current thread, 0 elsewhere.
  static CURRENT_POOL: Cell<usize> = const { Cell::new(0) };
}

enum Executor {
  Fixed(ThreadPool),
  Cached(Runtime),
}

struct Pool {
  id: usize,
  name: String,
  max_workers: Option<usize>,
  executor: Mutex<Option<Executor>>,
  in_flight: Mutex<usize>,
  drained: Condvar,
}

/// Cloneable handle to a thread pool; clones share the same workers.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: Arc<Pool>,
}

/// Configures a [`ThreadPoolScheduler`].
///
/// ```
/// use std::time::Duration;
/// use rxlite::scheduler::ThreadPoolScheduler;
///
/// let pool = ThreadPoolScheduler::builder()
///   .name("workers")
///   .keep_alive(Duration::from_secs(5))
///   .build()
///   .unwrap();
/// pool.shutdown();
/// ```
#[derive(Debug, Clone)]
pub struct ThreadPoolBuilder {
  name: String,
  max_workers: Option<usize>,
  keep_alive: Option<Duration>,
}

impl Default for ThreadPoolBuilder {
  fn default() -> Self {
    ThreadPoolBuilder { name: "rx-pool".to_owned(), max_workers: None, keep_alive: None }
  }
}

impl ThreadPoolBuilder {
  /// Prefix of the worker thread names; workers are named `{name}-{n}`.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Fixed number of workers. Zero is treated as one.
  pub fn max_workers(mut self, max_workers: usize) -> Self {
    self.max_workers = Some(max_workers.max(1));
    self
  }

  /// How long idle workers of an unbounded pool are kept. Workers of a pool
  /// with `max_workers` live until shutdown.
  pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
    self.keep_alive = Some(keep_alive);
    self
  }

  /// Starts the executor. Fails when the OS refuses to create its threads.
  pub fn build(self) -> Result<ThreadPoolScheduler, Error> {
    let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
    let executor = match self.max_workers {
      Some(size) => ThreadPool::builder()
        .pool_size(size)
        .name_prefix(format!("{}-", self.name))
        .after_start(move |_| CURRENT_POOL.with(|pool| pool.set(id)))
        .create()
        .map(Executor::Fixed),
      None => {
        let prefix = self.name.clone();
        let next_thread = AtomicUsize::new(0);
        Builder::new_current_thread()
          .max_blocking_threads(MAX_CACHED_WORKERS)
          .thread_keep_alive(self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE))
          .thread_name_fn(move || {
            format!("{}-{}", prefix, next_thread.fetch_add(1, Ordering::Relaxed))
          })
          .on_thread_start(move || CURRENT_POOL.with(|pool| pool.set(id)))
          .build()
          .map(Executor::Cached)
      }
    }
    .map_err(Error::new)?;
    trace!(pool = %self.name, max_workers = ?self.max_workers, "pool started");

    Ok(ThreadPoolScheduler {
      pool: Arc::new(Pool {
        id,
        name: self.name,
        max_workers: self.max_workers,
        executor: Mutex::new(Some(executor)),
        in_flight: Mutex::new(0),
        drained: Condvar::new(),
      }),
    })
  }
}

impl ThreadPoolScheduler {
  pub fn builder() -> ThreadPoolBuilder { ThreadPoolBuilder::default() }

  /// A pool without workers that rejects every task, standing in for a pool
  /// that could not be started.
  pub(crate) fn unavailable(name: impl Into<String>) -> Self {
    ThreadPoolScheduler {
      pool: Arc::new(Pool {
        id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
        name: name.into(),
        max_workers: None,
        executor: Mutex::new(None),
        in_flight: Mutex::new(0),
        drained: Condvar::new(),
      }),
    }
  }

  /// No bound on workers; idle ones are reused and retire after
  /// [`DEFAULT_KEEP_ALIVE`].
  pub fn unbounded() -> Result<Self, Error> { Self::builder().build() }

  /// Exactly `size` workers; extra tasks queue up.
  pub fn fixed(size: usize) -> Result<Self, Error> { Self::builder().max_workers(size).build() }

  /// One worker running tasks one at a time in submission order.
  pub fn single() -> Result<Self, Error> { Self::fixed(1) }

  /// Stops accepting tasks and waits until every accepted task has finished.
  /// Later submissions fail with [`Error::Rejected`].
  ///
  /// Calling it from a task running on this pool does not wait for that task.
  pub fn shutdown(&self) {
    let executor = lock(&self.pool.executor).take();
    if executor.is_some() {
      trace!(pool = %self.pool.name, "shutting down");
    }

    let own = usize::from(CURRENT_POOL.with(Cell::get) == self.pool.id);
    let mut in_flight = lock(&self.pool.in_flight);
    while *in_flight > own {
      in_flight = self.pool.drained.wait(in_flight).unwrap_or_else(PoisonError::into_inner);
    }
    drop(in_flight);

    if let Some(executor) = executor {
      executor.stop();
    }
  }

  pub fn is_shutdown(&self) -> bool { lock(&self.pool.executor).is_none() }
}

impl Scheduler for ThreadPoolScheduler {
  fn execute(&self, task: Task) -> Result<(), Error> {
    let executor = lock(&self.pool.executor);
    let Some(executor) = executor.as_ref() else {
      warn!(pool = %self.pool.name, "task submitted after shutdown was rejected");
      return Err(Error::Rejected(self.pool.name.clone()));
    };

    let guard = InFlight::enter(self.pool.clone());
    let job = move || {
      if let Err(err) = catch_panic(task) {
        error!(pool = %guard.0.name, %err, "task panicked");
      }
      drop(guard);
    };
    match executor {
      Executor::Fixed(pool) => pool.spawn_ok(futures::future::lazy(move |_| job())),
      Executor::Cached(runtime) => drop(runtime.spawn_blocking(job)),
    }
    Ok(())
  }
}

impl Executor {
  /// Lets the threads go without waiting for them.
  fn stop(self) {
    match self {
      Executor::Fixed(pool) => drop(pool),
      Executor::Cached(runtime) => runtime.shutdown_background(),
    }
  }
}

impl Drop for Pool {
  fn drop(&mut self) {
    let executor = self.executor.get_mut().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(executor) = executor {
      executor.stop();
    }
  }
}

/// Counts a task from submission until it has run or been dropped.
struct InFlight(Arc<Pool>);

impl InFlight {
  fn enter(pool: Arc<Pool>) -> Self {
    *lock(&pool.in_flight) += 1;
    InFlight(pool)
  }
}

impl Drop for InFlight {
  fn drop(&mut self) {
    *lock(&self.0.in_flight) -= 1;
    self.0.drained.notify_all();
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debug for ThreadPoolScheduler {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ThreadPoolScheduler")
      .field("name", &self.pool.name)
      .field("max_workers", &self.pool.max_workers)
      .field("in_flight", &*lock(&self.pool.in_flight))
      .field("shutdown", &self.is_shutdown())
      .finish()
  }
}

#[cfg(test)]
mod test {
  use std::{
    collections::HashSet,
    sync::{atomic::AtomicBool, mpsc, Barrier},
    thread,
  };

  use super::*;

  #[test]
  fn single_runs_in_submission_order() {
    let pool = ThreadPoolScheduler::single().unwrap();
    let seen = Arc::new(Mutex::new(vec![]));
    for i in 0..100 {
      let seen = seen.clone();
      pool.execute(Box::new(move || seen.lock().unwrap().push(i))).unwrap();
    }
    pool.shutdown();

    assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
  }

  #[test]
  fn single_never_runs_tasks_concurrently() {
    let pool = ThreadPoolScheduler::single().unwrap();
    let running = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
      let running = running.clone();
      let overlaps = overlaps.clone();
      pool
        .execute(Box::new(move || {
          if running.fetch_add(1, Ordering::SeqCst) != 0 {
            overlaps.fetch_add(1, Ordering::SeqCst);
          }
          thread::sleep(Duration::from_micros(100));
          running.fetch_sub(1, Ordering::SeqCst);
        }))
        .unwrap();
    }
    pool.shutdown();
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn fixed_pool_caps_workers() {
    let pool = ThreadPoolScheduler::fixed(3).unwrap();
    let threads = Arc::new(Mutex::new(HashSet::new()));
    for _ in 0..30 {
      let threads = threads.clone();
      pool
        .execute(Box::new(move || {
          threads.lock().unwrap().insert(thread::current().id());
          thread::sleep(Duration::from_millis(1));
        }))
        .unwrap();
    }
    pool.shutdown();
    assert!(threads.lock().unwrap().len() <= 3);
  }

  #[test]
  fn unbounded_pool_runs_blocking_tasks_concurrently() {
    let pool = ThreadPoolScheduler::unbounded().unwrap();
    let barrier = Arc::new(Barrier::new(8));
    let (tx, rx) = mpsc::channel();
    for _ in 0..8 {
      let barrier = barrier.clone();
      let tx = tx.clone();
      // Only completes if all eight tasks run at the same time.
      pool
        .execute(Box::new(move || {
          barrier.wait();
          tx.send(()).unwrap();
        }))
        .unwrap();
    }
    for _ in 0..8 {
      rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
    pool.shutdown();
  }

  #[test]
  fn worker_survives_panicking_task() {
    let pool = ThreadPoolScheduler::single().unwrap();
    pool.execute(Box::new(|| panic!("task failure"))).unwrap();
    let (tx, rx) = mpsc::channel();
    pool.execute(Box::new(move || tx.send(1).unwrap())).unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    pool.shutdown();
  }

  #[test]
  fn shutdown_drains_queue_and_rejects_new_tasks() {
    let pool = ThreadPoolScheduler::fixed(2).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    for _ in 0..20 {
      let count = count.clone();
      pool
        .execute(Box::new(move || {
          thread::sleep(Duration::from_millis(1));
          count.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    }
    pool.shutdown();
    assert_eq!(count.load(Ordering::SeqCst), 20);
    assert!(pool.is_shutdown());

    let c_count = count.clone();
    let rejected = pool.execute(Box::new(move || {
      c_count.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(rejected.is_err_and(|err| err.is_rejected()));
    assert_eq!(count.load(Ordering::SeqCst), 20);
    // A second shutdown is harmless.
    pool.shutdown();
  }

  #[test]
  fn shutdown_waits_for_running_blocking_task() {
    let pool = ThreadPoolScheduler::unbounded().unwrap();
    let (started_tx, started) = mpsc::channel();
    let finished = Arc::new(AtomicBool::new(false));
    let c_finished = finished.clone();
    pool
      .execute(Box::new(move || {
        started_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        c_finished.store(true, Ordering::SeqCst);
      }))
      .unwrap();
    started.recv_timeout(Duration::from_secs(5)).unwrap();
    pool.shutdown();
    assert!(finished.load(Ordering::SeqCst));
  }

  #[test]
  fn shutdown_from_worker_does_not_deadlock() {
    let pools = [ThreadPoolScheduler::single().unwrap(), ThreadPoolScheduler::unbounded().unwrap()];
    for pool in pools {
      let (tx, rx) = mpsc::channel();
      let c_pool = pool.clone();
      pool
        .execute(Box::new(move || {
          c_pool.shutdown();
          tx.send(c_pool.is_shutdown()).unwrap();
        }))
        .unwrap();
      assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
    }
  }

  #[test]
  fn last_handle_dropped_inside_a_task() {
    let pool = ThreadPoolScheduler::unbounded().unwrap();
    let c_pool = pool.clone();
    let (tx, rx) = mpsc::channel();
    pool
      .execute(Box::new(move || {
        drop(c_pool);
        tx.send(()).unwrap();
      }))
      .unwrap();
    drop(pool);
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
  }

  #[test]
  fn workers_are_named() {
    let name_on = |pool: &ThreadPoolScheduler| {
      let (tx, rx) = mpsc::channel();
      pool
        .execute(Box::new(move || {
          tx.send(thread::current().name().map(str::to_owned)).unwrap();
        }))
        .unwrap();
      rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap_or_default()
    };

    let fixed = ThreadPoolScheduler::builder().name("named").max_workers(1).build().unwrap();
    assert_eq!(name_on(&fixed), "named-0");
    fixed.shutdown();

    let cached = ThreadPoolScheduler::builder().name("cached").build().unwrap();
    assert!(name_on(&cached).starts_with("cached-"));
    cached.shutdown();
  }
}
