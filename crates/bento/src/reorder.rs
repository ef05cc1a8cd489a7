//! Ordered list editor
//!
//! Pointer-drag reordering for any ordered list. A [`ReorderSession`] keeps
//! a preview order (indices into the list as it was when the drag began)
//! that is recomputed on every pointer move; the list itself only changes on
//! [`commit`](ReorderSession::commit), which rebuilds it from the preview.
//! Dropping the session without committing is the cancel path.

use crate::error::{BoardError, Result};

/// Horizontal extent of one rendered item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub left: f64,
    pub width: f64,
}

impl ItemBounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn midpoint(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// One drag gesture over a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderSession {
    origin: usize,
    order: Vec<usize>,
}

impl ReorderSession {
    /// Pick up the item at `index` of a list of `len` items
    ///
    /// Returns `None` if `index` is out of range.
    pub fn begin(len: usize, index: usize) -> Option<Self> {
        (index < len).then(|| Self {
            origin: index,
            order: (0..len).collect(),
        })
    }

    /// Index the dragged item had when picked up
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Current preview position of the dragged item
    pub fn position(&self) -> usize {
        self.order
            .iter()
            .position(|&i| i == self.origin)
            .unwrap_or(self.origin)
    }

    /// Preview order as indices into the original list
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Whether the preview differs from the original order
    pub fn is_moved(&self) -> bool {
        self.order.iter().enumerate().any(|(pos, &i)| pos != i)
    }

    /// Recompute the insertion point for a pointer position
    ///
    /// `bounds` describes every item in the current preview order, dragged
    /// item included. The dragged item goes before the nearest sibling whose
    /// midpoint lies right of the pointer, or to the end when there is none.
    /// Returns true if the preview changed.
    pub fn hover(&mut self, pointer_x: f64, bounds: &[ItemBounds]) -> bool {
        if self.order.len() <= 1 {
            return false;
        }
        if bounds.len() != self.order.len() {
            tracing::debug!(
                expected = self.order.len(),
                found = bounds.len(),
                "Ignoring hover with mismatched layout"
            );
            return false;
        }

        let dragged = self.position();
        let mut target: Option<(usize, f64)> = None;
        for (pos, b) in bounds.iter().enumerate() {
            if pos == dragged {
                continue;
            }
            let mid = b.midpoint();
            if mid > pointer_x && target.map_or(true, |(_, best)| mid < best) {
                let sibling = if pos > dragged { pos - 1 } else { pos };
                target = Some((sibling, mid));
            }
        }

        let siblings = self.order.len() - 1;
        self.relocate(target.map_or(siblings, |(sibling, _)| sibling))
    }

    /// Place the dragged item at preview position `target` (clamped)
    ///
    /// Returns true if the preview changed.
    pub fn move_to(&mut self, target: usize) -> bool {
        if self.order.len() <= 1 {
            return false;
        }
        self.relocate(target.min(self.order.len() - 1))
    }

    /// Items in preview order, for live rendering
    pub fn preview<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.order.iter().filter_map(|&i| items.get(i)).collect()
    }

    /// Rebuild the list in preview order
    ///
    /// Fails with [`BoardError::StaleDrag`] if `items` no longer has the length
    /// the session began with.
    pub fn commit<T: Clone>(self, items: &[T]) -> Result<Vec<T>> {
        if items.len() != self.order.len() {
            return Err(BoardError::StaleDrag {
                expected: self.order.len(),
                found: items.len(),
            });
        }
        Ok(self.order.iter().map(|&i| items[i].clone()).collect())
    }

    /// Abandon the gesture; the list keeps its last committed order
    pub fn cancel(self) {}

    fn relocate(&mut self, slot: usize) -> bool {
        let before = self.order.clone();
        let from = self.position();
        let dragged = self.order.remove(from);
        self.order.insert(slot.min(self.order.len()), dragged);
        self.order != before
    }
}
