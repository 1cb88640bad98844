//! One-pass cursor over the selected elements of a sequence.
//!
//! The cursor keeps a raw scan position plus the index of the next matching
//! element found by look-ahead. `remove_current` rewinds the scan position to
//! the element most recently yielded, deletes it there and re-runs the
//! look-ahead from that point.

use super::{Selection, SelectionError, SelectionResult, Source};
use log::error;

pub struct Cursor<'a, T> {
    selection: &'a Selection<T>,
    source: Source,
    accumulate_removed: bool,
    // next raw index the look-ahead scan will inspect
    position: usize,
    // raw index of the element returned by the last successful step
    current: Option<usize>,
    // raw index of the next selected element, if any
    lookahead: Option<usize>,
    generation: u64,
    stale: bool,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(selection: &'a Selection<T>, source: Source, accumulate_removed: bool) -> Self {
        let generation = selection.backing().borrow().sequence(source).generation;
        let mut cursor = Self {
            selection,
            source,
            accumulate_removed,
            position: 0,
            current: None,
            lookahead: None,
            generation,
            stale: false,
        };
        cursor.lookahead = cursor.scan_forward();
        cursor
    }

    /// Returns `true` when another selected element is ahead of the cursor.
    pub fn has_next(&self) -> bool {
        self.lookahead.is_some()
    }

    /// Deletes the element returned by the last step and returns it.
    ///
    /// On a live cursor the element is appended to the removed sequence.
    ///
    /// # Errors
    /// - `PreconditionViolated` before the first step, on a second call for
    ///   the same step, or when the sequence changed outside this cursor.
    pub fn remove_current(&mut self) -> SelectionResult<T>
    where
        T: Clone,
    {
        self.ensure_fresh()?;
        let index = self.current.take().ok_or(SelectionError::PreconditionViolated(
            "remove_current requires a preceding successful step",
        ))?;

        let item = {
            let mut backing = self.selection.backing().borrow_mut();
            let sequence = backing.sequence_mut(self.source);
            let item = sequence.remove_at(index);
            self.generation = sequence.generation;
            if self.accumulate_removed {
                backing.removed.push(item.clone());
            }
            item
        };

        self.position = index;
        self.lookahead = self.scan_forward();
        Ok(item)
    }

    fn ensure_fresh(&mut self) -> SelectionResult<()> {
        let generation = self
            .selection
            .backing()
            .borrow()
            .sequence(self.source)
            .generation;
        if self.stale || generation != self.generation {
            self.stale = true;
            return Err(SelectionError::PreconditionViolated(
                "sequence was modified outside this cursor",
            ));
        }
        Ok(())
    }

    fn scan_forward(&mut self) -> Option<usize> {
        let backing = self.selection.backing().borrow();
        let items = &backing.sequence(self.source).items;
        while self.position < items.len() {
            let index = self.position;
            self.position += 1;
            if self.selection.selected(&items[index]) {
                return Some(index);
            }
        }
        None
    }
}

impl<T: Clone> Cursor<'_, T> {
    /// Advances to the next selected element.
    ///
    /// # Errors
    /// - `PreconditionViolated` when the sequence changed outside this cursor.
    pub fn try_next(&mut self) -> SelectionResult<Option<T>> {
        self.ensure_fresh()?;
        let Some(index) = self.lookahead else {
            return Ok(None);
        };

        let item = {
            let backing = self.selection.backing().borrow();
            backing.sequence(self.source).items[index].clone()
        };
        self.current = Some(index);
        self.lookahead = self.scan_forward();
        Ok(Some(item))
    }
}

impl<T: Clone> Iterator for Cursor<'_, T> {
    type Item = T;

    /// Yields the next selected element.
    ///
    /// A stale cursor ends the iteration and logs the violation; use
    /// [`Cursor::try_next`] to observe it as an error.
    fn next(&mut self) -> Option<T> {
        match self.try_next() {
            Ok(item) => item,
            Err(err) => {
                error!(
                    "event=selection_cursor module=selection status=error error={}",
                    err
                );
                None
            }
        }
    }
}
