//! Predicate capability used to filter selections.
//!
//! # Invariants
//! - `select` is a pure function of its argument and never mutates it.
//! - Selectors are not persisted; views are rebuilt after loading.

use std::rc::Rc;

/// Tests one candidate element of a selection.
pub trait Selector<T> {
    /// Returns `true` when `item` passes this selector.
    fn select(&self, item: &T) -> bool;
}

impl<T, F> Selector<T> for F
where
    F: Fn(&T) -> bool,
{
    fn select(&self, item: &T) -> bool {
        self(item)
    }
}

/// Reference-counted selector, shared between a view and the views derived from it.
pub type SharedSelector<T> = Rc<dyn Selector<T>>;

/// Wraps a concrete selector or closure into a [`SharedSelector`].
pub fn shared<T, S>(selector: S) -> SharedSelector<T>
where
    S: Selector<T> + 'static,
{
    Rc::new(selector)
}

/// Returns `true` when every selector accepts `item`.
///
/// An empty selector list accepts everything.
pub fn select_all<T>(selectors: &[SharedSelector<T>], item: &T) -> bool {
    selectors.iter().all(|selector| selector.select(item))
}
