//! Page-local name ordering.

use super::fold_case;
use crate::model::author::Author;
use crate::model::book::{Book, BookRecord};
use crate::model::genre::Genre;
use std::cmp::Ordering;

/// Requested ordering of a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// `sort=name`
    NameAsc,
    /// `sort=-name`
    NameDesc,
}

impl SortOrder {
    /// Parses the `sort` request parameter. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(Self::NameAsc),
            "-name" => Some(Self::NameDesc),
            _ => None,
        }
    }
}

/// Records that expose a sortable, filterable name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Author {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Genre {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Book {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for BookRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Reorders one fetched page by name.
///
/// Names compare case-folded first, then by raw text, so `apple` sorts
/// before `Banana`. The sort is stable: rows with identical names keep their
/// store order.
pub fn sort_page<T: Named>(items: &mut [T], order: Option<SortOrder>) {
    match order {
        Some(SortOrder::NameAsc) => items.sort_by(|a, b| compare_names(a.name(), b.name())),
        Some(SortOrder::NameDesc) => items.sort_by(|a, b| compare_names(b.name(), a.name())),
        None => {}
    }
}

fn compare_names(left: &str, right: &str) -> Ordering {
    fold_case(left)
        .cmp(&fold_case(right))
        .then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
    use super::{sort_page, SortOrder};
    use crate::model::genre::Genre;

    fn genres(names: &[&str]) -> Vec<Genre> {
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| Genre {
                id: idx as i64 + 1,
                name: (*name).to_string(),
            })
            .collect()
    }

    fn names(items: &[Genre]) -> Vec<&str> {
        items.iter().map(|genre| genre.name.as_str()).collect()
    }

    #[test]
    fn ascending_and_descending() {
        let mut items = genres(&["poetry", "drama", "satire"]);
        sort_page(&mut items, Some(SortOrder::NameAsc));
        assert_eq!(names(&items), vec!["drama", "poetry", "satire"]);

        sort_page(&mut items, Some(SortOrder::NameDesc));
        assert_eq!(names(&items), vec!["satire", "poetry", "drama"]);
    }

    #[test]
    fn case_does_not_split_the_order() {
        let mut items = genres(&["cherry", "Banana", "apple"]);
        sort_page(&mut items, Some(SortOrder::NameAsc));
        assert_eq!(names(&items), vec!["apple", "Banana", "cherry"]);

        let mut items = genres(&["b", "B", "a"]);
        sort_page(&mut items, Some(SortOrder::NameAsc));
        assert_eq!(names(&items), vec!["a", "B", "b"]);
        sort_page(&mut items, Some(SortOrder::NameDesc));
        assert_eq!(names(&items), vec!["b", "B", "a"]);
    }

    #[test]
    fn no_order_keeps_store_order() {
        let mut items = genres(&["poetry", "drama", "satire"]);
        sort_page(&mut items, None);
        assert_eq!(names(&items), vec!["poetry", "drama", "satire"]);
    }

    #[test]
    fn equal_names_keep_store_order() {
        let mut items = genres(&["b", "a", "b"]);
        sort_page(&mut items, Some(SortOrder::NameAsc));
        let ids: Vec<i64> = items.iter().map(|genre| genre.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
