//! Occurrence merge policy and deduplicating accumulators
//!
//! A child reachable through several paths of a content model (inside a
//! `choice` and inside a `sequence`, or directly and through an expanded
//! class) is reported once, with the loosest combined constraint.

use crate::model::{Attribute, ChildRef, Compositor};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Merge an incoming occurrence of a child into an existing one.
///
/// Without an existing record the incoming one is adopted. Otherwise the
/// lower bound is the smaller of the two, the upper bound the larger
/// (`unbounded` wins), and the compositor becomes `choice` if either side is
/// a choice, else stays the existing one.
pub fn merge_occurrence(existing: Option<&ChildRef>, incoming: &ChildRef) -> ChildRef {
    let Some(existing) = existing else {
        return incoming.clone();
    };

    let compositor =
        if existing.compositor == Compositor::Choice || incoming.compositor == Compositor::Choice {
            Compositor::Choice
        } else {
            existing.compositor
        };

    ChildRef {
        name: existing.name.clone(),
        min_occurs: existing.min_occurs.min(incoming.min_occurs),
        max_occurs: existing.max_occurs.max(incoming.max_occurs),
        compositor,
    }
}

/// Child references keyed by child name, merged on insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildRefSet {
    refs: BTreeMap<String, ChildRef>,
}

impl ChildRefSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an occurrence, merging with any earlier occurrence of the same child
    pub fn insert(&mut self, incoming: ChildRef) {
        match self.refs.entry(incoming.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
            Entry::Occupied(mut slot) => {
                let merged = merge_occurrence(Some(slot.get()), &incoming);
                slot.insert(merged);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ChildRef> {
        self.refs.get(name)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Child names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.refs.keys().map(String::as_str)
    }

    /// Merged references, sorted by child name
    pub fn into_sorted(self) -> Vec<ChildRef> {
        self.refs.into_values().collect()
    }
}

impl Extend<ChildRef> for ChildRefSet {
    fn extend<I: IntoIterator<Item = ChildRef>>(&mut self, iter: I) {
        for child in iter {
            self.insert(child);
        }
    }
}

impl FromIterator<ChildRef> for ChildRefSet {
    fn from_iter<I: IntoIterator<Item = ChildRef>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Attributes keyed by name; the first declaration of a name wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute unless one with the same name was seen already.
    /// Returns whether it was added.
    pub fn insert(&mut self, attribute: Attribute) -> bool {
        match self.attributes.entry(attribute.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(attribute);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes sorted by name
    pub fn into_sorted(self) -> Vec<Attribute> {
        self.attributes.into_values().collect()
    }
}

impl Extend<Attribute> for AttributeSet {
    fn extend<I: IntoIterator<Item = Attribute>>(&mut self, iter: I) {
        for attribute in iter {
            self.insert(attribute);
        }
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
