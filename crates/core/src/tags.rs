//! Option Tags
//!
//! Sorted, de-duplicated tag sets attached to options. Rule triggers match
//! against them, so intersection is the hot operation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A sorted set of string tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags {
    tags: SmallVec<[String; 4]>,
}

impl Tags {
    /// Create a tag set, sorting and removing duplicates.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 4]>) -> Self {
        let mut collection = Self { tags };

        collection.tags.sort();
        collection.tags.dedup();

        collection
    }

    /// Create a tag set from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(tags.iter().map(ToString::to_string).collect())
    }

    /// Whether the set contains `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|candidate| candidate.as_str().cmp(tag))
            .is_ok()
    }

    /// Whether the two sets share at least one tag.
    pub fn intersects(&self, other: &Self) -> bool {
        // Both sides are sorted, so walk them together.
        let mut left = self.tags.iter();
        let mut right = other.tags.iter();
        let mut left_tag = left.next();
        let mut right_tag = right.next();

        while let (Some(left_tag_ref), Some(right_tag_ref)) = (left_tag, right_tag) {
            match left_tag_ref.cmp(right_tag_ref) {
                Ordering::Equal => return true,
                Ordering::Less => left_tag = left.next(),
                Ordering::Greater => right_tag = right.next(),
            }
        }

        false
    }

    /// Add a tag, keeping the set sorted.
    pub fn add(&mut self, tag: &str) {
        if let Err(pos) = self.tags.binary_search_by(|candidate| candidate.as_str().cmp(tag)) {
            self.tags.insert(pos, tag.to_string());
        }
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags.into_iter().collect())
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.tags.into_vec()
    }
}
