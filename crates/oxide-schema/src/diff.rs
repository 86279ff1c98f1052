//! Name-keyed set difference between expected and actual item lists.

use std::collections::{HashMap, HashSet};

use crate::delta::Severity;
use crate::model::{Column, ForeignKey, Index};

/// Items identified by a case-insensitive name.
pub trait Named {
    /// The item's name.
    fn name(&self) -> &str;
}

impl Named for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ForeignKey {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An item present on both sides under the same name but not equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    /// The desired item.
    pub expected: T,
    /// The item found in the database.
    pub actual: T,
}

/// Classification of two item lists.
///
/// Every expected item lands in exactly one of `matched`, `missing` or
/// `different`; every actual item in exactly one of `matched`, `extra` or
/// `different`. Items pair up by exact (case-insensitive) name; renames
/// show up as one missing and one extra item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDelta<T> {
    /// Present on both sides and equivalent (expected side kept).
    pub matched: Vec<T>,
    /// Expected but absent from the database.
    pub missing: Vec<T>,
    /// In the database but not expected.
    pub extra: Vec<T>,
    /// Present on both sides but not equivalent.
    pub different: Vec<Change<T>>,
}

impl<T> Default for ItemDelta<T> {
    fn default() -> Self {
        Self {
            matched: Vec::new(),
            missing: Vec::new(),
            extra: Vec::new(),
            different: Vec::new(),
        }
    }
}

impl<T: Named + Clone> ItemDelta<T> {
    /// Classifies the items with a caller-supplied equivalence.
    pub fn compare<F>(expected: &[T], actual: &[T], mut equivalent: F) -> Self
    where
        F: FnMut(&T, &T) -> bool,
    {
        let by_name: HashMap<String, &T> = expected
            .iter()
            .map(|item| (item.name().to_lowercase(), item))
            .collect();
        let actual_names: HashSet<String> =
            actual.iter().map(|item| item.name().to_lowercase()).collect();

        let mut delta = Self::default();
        for item in actual {
            match by_name.get(&item.name().to_lowercase()) {
                None => delta.extra.push(item.clone()),
                Some(wanted) if equivalent(wanted, item) => delta.matched.push((*wanted).clone()),
                Some(wanted) => delta.different.push(Change {
                    expected: (*wanted).clone(),
                    actual: item.clone(),
                }),
            }
        }
        delta.missing = expected
            .iter()
            .filter(|item| !actual_names.contains(&item.name().to_lowercase()))
            .cloned()
            .collect();
        delta
    }

    /// Classifies the items with structural equality.
    pub fn new(expected: &[T], actual: &[T]) -> Self
    where
        T: PartialEq,
    {
        Self::compare(expected, actual, |a, b| a == b)
    }

    /// The same classification seen from the other side: missing and
    /// extra swap, and each change is reversed.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            matched: self.matched.clone(),
            missing: self.extra.clone(),
            extra: self.missing.clone(),
            different: self
                .different
                .iter()
                .map(|c| Change {
                    expected: c.actual.clone(),
                    actual: c.expected.clone(),
                })
                .collect(),
        }
    }
}

impl<T> ItemDelta<T> {
    /// Returns true if anything is missing, extra or different.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !(self.missing.is_empty() && self.extra.is_empty() && self.different.is_empty())
    }

    /// `Update` when there are changes, `None` otherwise.
    #[must_use]
    pub fn severity(&self) -> Severity {
        if self.has_changes() {
            Severity::Update
        } else {
            Severity::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<T: Named>(items: &[T]) -> Vec<&str> {
        items.iter().map(Named::name).collect()
    }

    #[test]
    fn classifies_every_item_once() {
        let expected = vec![
            Column::new("id", "INTEGER"),
            Column::new("email", "TEXT"),
            Column::new("age", "INTEGER"),
        ];
        let actual = vec![
            Column::new("ID", "INTEGER"),
            Column::new("age", "BIGINT"),
            Column::new("legacy", "TEXT"),
        ];

        let delta = ItemDelta::compare(&expected, &actual, Column::is_equivalent_to);
        assert_eq!(names(&delta.matched), vec!["id"]);
        assert_eq!(names(&delta.missing), vec!["email"]);
        assert_eq!(names(&delta.extra), vec!["legacy"]);
        assert_eq!(delta.different.len(), 1);
        assert_eq!(delta.different[0].expected.column_type, "INTEGER");
        assert_eq!(delta.different[0].actual.column_type, "BIGINT");
        assert_eq!(delta.severity(), Severity::Update);
    }

    #[test]
    fn identical_lists_have_no_changes() {
        let items = vec![Index::new("a", ["x"]), Index::new("b", ["y"])];
        let delta = ItemDelta::new(&items, &items);
        assert!(!delta.has_changes());
        assert_eq!(delta.matched.len(), 2);
        assert_eq!(delta.severity(), Severity::None);
    }

    #[test]
    fn structural_equality_is_strict() {
        let expected = vec![Index::new("a", ["x"]).unique()];
        let actual = vec![Index::new("a", ["x"])];
        let delta = ItemDelta::new(&expected, &actual);
        assert_eq!(delta.different.len(), 1);
    }

    #[test]
    fn inverted_swaps_sides() {
        let expected = vec![Column::new("a", "TEXT"), Column::new("b", "TEXT")];
        let actual = vec![Column::new("b", "INTEGER"), Column::new("c", "TEXT")];
        let delta = ItemDelta::compare(&expected, &actual, Column::is_equivalent_to).inverted();
        assert_eq!(names(&delta.missing), vec!["c"]);
        assert_eq!(names(&delta.extra), vec!["a"]);
        assert_eq!(delta.different[0].expected.column_type, "INTEGER");
    }

    #[test]
    fn empty_sides() {
        let expected = vec![ForeignKey::new("fk_a")];
        let delta = ItemDelta::new(&expected, &[]);
        assert_eq!(names(&delta.missing), vec!["fk_a"]);
        let delta = ItemDelta::new(&[], &expected);
        assert_eq!(names(&delta.extra), vec!["fk_a"]);
    }
}
