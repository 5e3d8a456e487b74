//! Cross-view selection
//!
//! The store owns the only selection set. Views never keep their own copy;
//! they read through a [`SelectionCoordinator`] and request replacements.

use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;

use crate::store::AppStore;

/// Set of selected record IDs. Membership is the only meaningful query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: AHashSet<String>,
}

impl SelectionSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// IDs in ascending order, for display and stable comparisons
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which view asked for a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Chart,
    Table,
    Programmatic,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chart => f.write_str("chart"),
            Self::Table => f.write_str("table"),
            Self::Programmatic => f.write_str("programmatic"),
        }
    }
}

/// Handle the views use to read and replace the shared selection
#[derive(Clone)]
pub struct SelectionCoordinator {
    store: Arc<AppStore>,
}

impl SelectionCoordinator {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self { store }
    }

    /// Current selection
    pub fn selected(&self) -> SelectionSet {
        self.store.read(|state| state.selection.clone())
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.store.read(|state| state.selection.contains(id))
    }

    /// Replace the selection with the IDs picked in the chart
    pub fn set_from_chart<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.select_from(SelectionSource::Chart, ids);
    }

    /// Replace the selection with the rows checked in the table
    pub fn set_from_table<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.select_from(SelectionSource::Table, ids);
    }

    pub fn clear(&self) {
        self.store.select_from(SelectionSource::Programmatic, Vec::<String>::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_replaces_instead_of_merging() {
        let store = Arc::new(AppStore::default());
        let selection = SelectionCoordinator::new(store.clone());

        selection.set_from_chart(["a"]);
        selection.set_from_table(["b", "c"]);

        let expected: SelectionSet = ["b", "c"].into_iter().collect();
        assert_eq!(selection.selected(), expected);
        assert!(!selection.is_selected("a"));
    }

    #[test]
    fn both_views_observe_the_same_set() {
        let store = Arc::new(AppStore::default());
        let chart = SelectionCoordinator::new(store.clone());
        let table = SelectionCoordinator::new(store.clone());

        table.set_from_table(["x", "y"]);

        assert_eq!(chart.selected(), table.selected());
        assert_eq!(store.snapshot().selection, chart.selected());
        assert!(chart.is_selected("y"));
    }

    #[test]
    fn empty_input_clears_selection() {
        let store = Arc::new(AppStore::default());
        let selection = SelectionCoordinator::new(store);

        selection.set_from_chart(["a"]);
        selection.set_from_chart(Vec::<String>::new());
        assert!(selection.selected().is_empty());

        selection.set_from_table(["b"]);
        selection.clear();
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn duplicate_ids_in_request_collapse() {
        let set: SelectionSet = ["a", "a", "b"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_sorted_vec(), vec!["a".to_string(), "b".to_string()]);
    }
}
