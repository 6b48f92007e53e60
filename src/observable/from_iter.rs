use crate::observable::Observable;

impl<Item: Send + 'static> Observable<Item> {
  /// Creates an observable that produces values from an iterator.
  ///
  /// Completes when all elements have been emitted. The iterable is cloned
  /// for every subscription.
  ///
  /// ```
  /// use rxlite::prelude::*;
  ///
  /// Observable::from_iter(vec![0, 1, 2, 3]).subscribe_next(|v| println!("{},", v));
  /// ```
  pub fn from_iter<Iter>(iter: Iter) -> Self
  where
    Iter: IntoIterator<Item = Item> + Clone + Send + Sync + 'static,
  {
    Observable::create(move |subscriber| {
      iter.clone().into_iter().for_each(|v| subscriber.next(v));
      subscriber.complete();
      Ok(())
    })
  }

  /// Creates an observable producing a single value.
  pub fn of(value: Item) -> Self
  where
    Item: Clone + Sync,
  {
    Observable::create(move |subscriber| {
      subscriber.next(value.clone());
      subscriber.complete();
      Ok(())
    })
  }
}
