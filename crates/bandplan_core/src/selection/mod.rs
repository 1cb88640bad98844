//! Lazily filtered, reversible views over a shared backing store.
//!
//! # Responsibility
//! - Provide the collection type every record family is stored in.
//! - Compose filters by deriving views that share one backing store.
//! - Keep removed elements restorable through the same family of views.
//!
//! # Invariants
//! - All views of one family share the same `live` and `removed` sequences.
//! - An element is either live or removed, never both.
//! - `add` bypasses filtering; iteration, counting and removal do not.
//! - `restore` filters with the predicates of the view it is called on, not
//!   the ones active when the element was removed.
//!
//! # Concurrency
//! Single writer, single thread. The backing store is an `Rc<RefCell<_>>`,
//! so overlapping mutable access panics instead of interleaving. Cursors
//! detect structural changes made behind their back through a per-sequence
//! generation counter and report them as `PreconditionViolated`.

mod cursor;
pub mod selector;

pub use cursor::Cursor;
pub use selector::{select_all, shared, Selector, SharedSelector};

use log::error;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type SelectionResult<T> = Result<T, SelectionError>;

/// Misuse of a selection cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    PreconditionViolated(&'static str),
}

impl Display for SelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreconditionViolated(reason) => {
                write!(f, "selection precondition violated: {reason}")
            }
        }
    }
}

impl Error for SelectionError {}

/// One ordered sequence plus the counter bumped on every structural change.
#[derive(Debug)]
pub(crate) struct Sequence<T> {
    pub(crate) items: Vec<T>,
    pub(crate) generation: u64,
}

impl<T> Sequence<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            items,
            generation: 0,
        }
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
        self.generation += 1;
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        let item = self.items.remove(index);
        self.generation += 1;
        item
    }
}

/// Which of the two shared sequences a cursor walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    Live,
    Removed,
}

#[derive(Debug)]
pub(crate) struct Backing<T> {
    pub(crate) live: Sequence<T>,
    pub(crate) removed: Sequence<T>,
}

impl<T> Backing<T> {
    pub(crate) fn sequence(&self, source: Source) -> &Sequence<T> {
        match source {
            Source::Live => &self.live,
            Source::Removed => &self.removed,
        }
    }

    pub(crate) fn sequence_mut(&mut self, source: Source) -> &mut Sequence<T> {
        match source {
            Source::Live => &mut self.live,
            Source::Removed => &mut self.removed,
        }
    }
}

/// Filtered view over a backing store shared with every view derived from it.
///
/// Cloning a selection clones the handle, not the elements.
pub struct Selection<T> {
    backing: Rc<RefCell<Backing<T>>>,
    selectors: Vec<SharedSelector<T>>,
}

impl<T> Clone for Selection<T> {
    fn clone(&self) -> Self {
        Self {
            backing: Rc::clone(&self.backing),
            selectors: self.selectors.clone(),
        }
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Selection<T> {
    /// Creates an empty selection with its own backing store and no selectors.
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    /// Rebuilds a selection from previously captured live and removed elements.
    pub fn from_parts(live: Vec<T>, removed: Vec<T>) -> Self {
        Self {
            backing: Rc::new(RefCell::new(Backing {
                live: Sequence::new(live),
                removed: Sequence::new(removed),
            })),
            selectors: Vec::new(),
        }
    }

    /// Derives a view sharing this view's backing store.
    ///
    /// The new view's selectors are `selectors` followed by every selector
    /// accumulated by `self`. `self` is left untouched.
    pub fn view(&self, selectors: Vec<SharedSelector<T>>) -> Self {
        let mut combined = selectors;
        combined.extend(self.selectors.iter().cloned());
        Self {
            backing: Rc::clone(&self.backing),
            selectors: combined,
        }
    }

    /// Derives a view with one additional selector.
    pub fn filter<S>(&self, selector: S) -> Self
    where
        S: Selector<T> + 'static,
    {
        self.view(vec![shared(selector)])
    }

    /// Returns whether `other` works on the same backing store.
    pub fn shares_store_with(&self, other: &Selection<T>) -> bool {
        Rc::ptr_eq(&self.backing, &other.backing)
    }

    /// Number of selectors active on this view.
    pub fn selector_count(&self) -> usize {
        self.selectors.len()
    }

    /// Appends `element` to the shared live sequence without filtering.
    pub fn add(&self, element: T) {
        self.backing.borrow_mut().live.push(element);
    }

    /// Returns `true` when every active selector accepts `element`.
    pub fn selected(&self, element: &T) -> bool {
        select_all(&self.selectors, element)
    }

    /// Number of selected live elements.
    pub fn count(&self) -> usize {
        let backing = self.backing.borrow();
        backing
            .live
            .items
            .iter()
            .filter(|item| self.selected(item))
            .count()
    }

    /// Returns `true` when no live element is selected.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of elements in the shared removed sequence, ignoring selectors.
    pub fn removed_len(&self) -> usize {
        self.backing.borrow().removed.items.len()
    }

    /// Visits every selected live element in order.
    pub fn for_each(&self, mut visit: impl FnMut(&T)) {
        let backing = self.backing.borrow();
        for item in backing.live.items.iter().filter(|item| self.selected(item)) {
            visit(item);
        }
    }

    /// Mutates every selected live element in place; returns how many were visited.
    ///
    /// Selection is decided before each element is handed out, so a mutation
    /// that makes an element fail the selectors does not skip later ones.
    pub fn for_each_mut(&self, mut update: impl FnMut(&mut T)) -> usize {
        let mut backing = self.backing.borrow_mut();
        let mut visited = 0;
        for item in backing.live.items.iter_mut() {
            if select_all(&self.selectors, item) {
                update(item);
                visited += 1;
            }
        }
        visited
    }

    /// Mutates the first selected live element in place.
    pub fn update_first<R>(&self, update: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut backing = self.backing.borrow_mut();
        let item = backing
            .live
            .items
            .iter_mut()
            .find(|item| select_all(&self.selectors, &**item))?;
        Some(update(item))
    }

    /// Folds over the selected live elements.
    pub fn fold<A>(&self, init: A, mut step: impl FnMut(A, &T) -> A) -> A {
        let backing = self.backing.borrow();
        backing
            .live
            .items
            .iter()
            .filter(|item| self.selected(item))
            .fold(init, |acc, item| step(acc, item))
    }

    /// Opens a cursor over the selected live elements.
    ///
    /// Elements deleted through the cursor go to the removed sequence and can
    /// be brought back with [`Selection::restore`].
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self, Source::Live, true)
    }

    /// Opens a cursor over the selected removed elements.
    ///
    /// Elements deleted through this cursor are dropped for good.
    pub fn removed_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self, Source::Removed, false)
    }

    pub(crate) fn backing(&self) -> &Rc<RefCell<Backing<T>>> {
        &self.backing
    }
}

impl<T: Clone> Selection<T> {
    /// Returns the selected live elements as a new vector, in live order.
    pub fn as_list(&self) -> Vec<T> {
        self.fold(Vec::new(), |mut list, item| {
            list.push(item.clone());
            list
        })
    }

    /// Returns the first selected live element, if any.
    pub fn first(&self) -> Option<T> {
        let backing = self.backing.borrow();
        backing
            .live
            .items
            .iter()
            .find(|item| self.selected(item))
            .cloned()
    }

    /// Moves every selected live element to the removed sequence.
    ///
    /// Returns the number of elements removed.
    ///
    /// # Errors
    /// - `PreconditionViolated` when the live sequence changes while the
    ///   removal walks it. Elements already moved stay removed.
    pub fn remove(&self) -> SelectionResult<usize> {
        self.remove_with(|_| {})
    }

    /// Like [`Selection::remove`], calling `before_remove` on each element
    /// right before it leaves the live sequence.
    pub(crate) fn remove_with(
        &self,
        mut before_remove: impl FnMut(&T),
    ) -> SelectionResult<usize> {
        let mut cursor = self.cursor();
        let mut removed = 0;
        let outcome = loop {
            match cursor.try_next() {
                Ok(Some(item)) => before_remove(&item),
                Ok(None) => break Ok(removed),
                Err(err) => break Err(err),
            }
            if let Err(err) = cursor.remove_current() {
                break Err(err);
            }
            removed += 1;
        };
        if let Err(err) = &outcome {
            error!(
                "event=selection_remove module=selection status=error removed={} error={}",
                removed, err
            );
        }
        outcome
    }

    /// Moves every removed element selected by this view back to the live sequence.
    ///
    /// Returns the number of elements restored.
    ///
    /// # Errors
    /// - `PreconditionViolated` when the removed sequence changes while the
    ///   restore walks it. Elements already moved stay live.
    pub fn restore(&self) -> SelectionResult<usize> {
        let mut cursor = self.removed_cursor();
        let mut restored = 0;
        let outcome = loop {
            match cursor.try_next() {
                Ok(Some(_)) => {}
                Ok(None) => break Ok(restored),
                Err(err) => break Err(err),
            }
            match cursor.remove_current() {
                Ok(item) => {
                    self.backing.borrow_mut().live.push(item);
                    restored += 1;
                }
                Err(err) => break Err(err),
            }
        };
        if let Err(err) = &outcome {
            error!(
                "event=selection_restore module=selection status=error restored={} error={}",
                restored, err
            );
        }
        outcome
    }

    /// Returns every live element regardless of selectors.
    pub(crate) fn live_snapshot(&self) -> Vec<T> {
        self.backing.borrow().live.items.clone()
    }

    /// Returns every removed element regardless of selectors.
    pub(crate) fn removed_snapshot(&self) -> Vec<T> {
        self.backing.borrow().removed.items.clone()
    }
}

impl<T: Display> Selection<T> {
    /// Renders the selected elements as `[a, b, c]`.
    pub fn render(&self) -> String {
        let mut rendered = String::from("[");
        let mut first = true;
        self.for_each(|item| {
            if !first {
                rendered.push_str(", ");
            }
            rendered.push_str(&item.to_string());
            first = false;
        });
        rendered.push(']');
        rendered
    }
}

impl<'a, T: Clone> IntoIterator for &'a Selection<T> {
    type Item = T;
    type IntoIter = Cursor<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::{shared, Selection, SelectionError, SharedSelector};

    fn numbers(values: &[i32]) -> Selection<i32> {
        let selection = Selection::new();
        for value in values {
            selection.add(*value);
        }
        selection
    }

    fn even() -> SharedSelector<i32> {
        shared(|value: &i32| value % 2 == 0)
    }

    #[test]
    fn view_shares_backing_store_and_keeps_base_untouched() {
        let base = numbers(&[1, 2, 3, 4]);
        let evens = base.view(vec![even()]);

        assert!(evens.shares_store_with(&base));
        assert_eq!(base.selector_count(), 0);
        assert_eq!(evens.selector_count(), 1);

        base.add(6);
        assert_eq!(evens.as_list(), vec![2, 4, 6]);
        assert_eq!(base.count(), 5);
    }

    #[test]
    fn add_bypasses_the_view_filter() {
        let base = numbers(&[]);
        let evens = base.view(vec![even()]);

        evens.add(7);
        assert_eq!(evens.count(), 0);
        assert_eq!(base.as_list(), vec![7]);
    }

    #[test]
    fn first_returns_none_when_nothing_matches() {
        let base = numbers(&[1, 3]);
        assert_eq!(base.view(vec![even()]).first(), None);
        assert_eq!(base.first(), Some(1));
    }

    #[test]
    fn remove_moves_selected_elements_in_live_order() {
        let base = numbers(&[1, 2, 3, 4, 5, 6]);
        let evens = base.view(vec![even()]);

        assert_eq!(evens.remove(), Ok(3));
        assert_eq!(base.as_list(), vec![1, 3, 5]);
        assert_eq!(base.removed_snapshot(), vec![2, 4, 6]);
    }

    #[test]
    fn restore_returns_only_elements_selected_by_current_view() {
        let base = numbers(&[1, 2, 3, 4]);
        assert_eq!(base.remove(), Ok(4));

        let evens = base.view(vec![even()]);
        assert_eq!(evens.restore(), Ok(2));
        assert_eq!(base.as_list(), vec![2, 4]);
        assert_eq!(base.removed_snapshot(), vec![1, 3]);
    }

    #[test]
    fn remove_reports_mutation_from_the_callback() {
        let base = numbers(&[2, 4, 6]);
        let same_store = base.clone();

        let result = base.remove_with(|_| same_store.add(8));
        assert!(matches!(
            result,
            Err(SelectionError::PreconditionViolated(_))
        ));
        assert_eq!(base.as_list(), vec![2, 4, 6, 8]);
        assert_eq!(base.removed_len(), 0);
    }

    #[test]
    fn for_each_mut_edits_selected_elements_only() {
        let base = numbers(&[1, 2, 3, 4]);
        let evens = base.view(vec![even()]);

        assert_eq!(evens.for_each_mut(|value| *value *= 10), 2);
        assert_eq!(base.as_list(), vec![1, 20, 3, 40]);
    }

    #[test]
    fn update_first_touches_one_element() {
        let base = numbers(&[1, 2, 3, 4]);
        let result = base.view(vec![even()]).update_first(|value| {
            *value += 1;
            *value
        });
        assert_eq!(result, Some(3));
        assert_eq!(base.as_list(), vec![1, 3, 3, 4]);
    }

    #[test]
    fn render_lists_selected_elements() {
        let base = numbers(&[1, 2, 3]);
        assert_eq!(base.render(), "[1, 2, 3]");
        assert_eq!(base.view(vec![even()]).render(), "[2]");
        assert_eq!(numbers(&[]).render(), "[]");
    }

    #[test]
    fn error_display_names_the_violated_precondition() {
        let err = SelectionError::PreconditionViolated("no current element");
        assert!(err.to_string().contains("no current element"));
    }
}
