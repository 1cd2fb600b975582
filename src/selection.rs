//! Multi-select state for bulk actions on a listing.

use std::collections::BTreeSet;

/// Set of selected ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<Id: Ord> {
    /// Selected ids, ordered for stable bulk requests.
    selected: BTreeSet<Id>,
}

impl<Id: Ord> Default for Selection<Id> {
    #[inline]
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<Id: Ord + Copy> Selection<Id> {
    /// Creates an empty selection.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id`, or deselects it if already selected. Returns whether
    /// it is selected afterwards.
    #[inline]
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id)
        }
    }

    /// Selects exactly `ids`.
    #[inline]
    pub fn select_all<I: IntoIterator<Item = Id>>(&mut self, ids: I) {
        self.selected = ids.into_iter().collect();
    }

    /// Deselects everything.
    #[inline]
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Whether `id` is selected.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected ids.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether every one of `total` listed items is selected. An empty
    /// listing is never "all selected".
    #[inline]
    #[must_use]
    pub fn is_all_selected(&self, total: usize) -> bool {
        total > 0 && self.selected.len() == total
    }

    /// Selected ids in ascending order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> Vec<Id> {
        self.selected.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::new();
        assert!(selection.toggle(TransactionId::new(1)));
        assert!(selection.contains(&TransactionId::new(1)));
        assert!(!selection.toggle(TransactionId::new(1)));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_then_deselect_one() {
        let ids: Vec<TransactionId> = (1..=5).map(TransactionId::new).collect();
        let mut selection = Selection::new();
        selection.select_all(ids.iter().copied());
        assert!(selection.is_all_selected(ids.len()));

        let _selected = selection.toggle(TransactionId::new(3));
        assert_eq!(selection.len(), ids.len() - 1);
        assert!(!selection.is_all_selected(ids.len()));
        assert_eq!(
            selection.ids(),
            [1, 2, 4, 5].map(TransactionId::new).to_vec()
        );
    }

    #[test]
    fn empty_listing_is_not_all_selected() {
        let selection: Selection<TransactionId> = Selection::new();
        assert!(!selection.is_all_selected(0));
    }

    #[test]
    fn clear_deselects_everything() {
        let mut selection = Selection::new();
        selection.select_all([TransactionId::new(1), TransactionId::new(2)]);
        selection.clear();
        assert!(selection.ids().is_empty());
    }
}
