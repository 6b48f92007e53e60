use crate::{error::Error, observable::Observable};

impl Observable<i32> {
  /// Creates an observable that synchronously emits `count` consecutive
  /// integers starting at `start`, then completes.
  ///
  /// The producer does not watch for disposal; it always runs to the end.
  /// A range reaching past `i32::MAX` emits up to `i32::MAX` and then
  /// terminates with an error.
  ///
  /// ```
  /// use rxlite::prelude::*;
  ///
  /// Observable::range(1, 5).subscribe_next(|v| println!("{}", v));
  /// ```
  pub fn range(start: i32, count: usize) -> Self {
    Observable::create(move |subscriber| {
      for offset in 0..count {
        let value = i32::try_from(offset)
          .ok()
          .and_then(|offset| start.checked_add(offset))
          .ok_or_else(|| Error::msg(format!("range({}, {}) overflows i32", start, count)))?;
        subscriber.next(value);
      }
      subscriber.complete();
      Ok(())
    })
  }
}
