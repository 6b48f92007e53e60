//! Operators.
//!
//! Each operator is an inherent method on [`Observable`](crate::Observable)
//! that returns a new Observable whose subscription procedure subscribes to
//! the previous one through an operator-specific observer.

pub mod filter;
pub mod flat_map;
pub mod map;
pub mod observe_on;
pub mod subscribe_on;

pub use filter::FilterObserver;
pub use flat_map::{FlatMapInnerObserver, FlatMapObserver};
pub use map::MapObserver;
pub use observe_on::ObserveOnObserver;
