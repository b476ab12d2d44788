//! Destination tags and tag groups.
//!
//! A tag group is a named set of tags. Groups may list other groups; after
//! normalization every group holds the tags reachable through it, and an
//! entry carrying any of those tags is also tagged with the group name.

use std::collections::{BTreeMap, BTreeSet};

/// Set of tags attached to a destination.
pub type TagSet = BTreeSet<String>;

/// Group name → member tags (which may name other groups).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagGroups {
    groups: BTreeMap<String, TagSet>,
}

impl TagGroups {
    /// Create an empty group table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tags` to every group in `groups`.
    ///
    /// A group never lists itself.
    pub fn assign<G, T>(&mut self, groups: G, tags: T)
    where
        G: IntoIterator,
        G::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let tags: TagSet = tags.into_iter().map(Into::into).collect();
        for group in groups {
            let group = group.into();
            let members = self.groups.entry(group.clone()).or_default();
            members.extend(tags.iter().filter(|tag| **tag != group).cloned());
        }
    }

    /// Returns true when no group is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Members of `group`, if it exists.
    #[must_use]
    pub fn members(&self, group: &str) -> Option<&TagSet> {
        self.groups.get(group)
    }

    /// Iterate over groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagSet)> {
        self.groups.iter()
    }

    /// Expand groups of groups transitively and drop empty groups.
    ///
    /// Cycles are cut where they close. Returns the names of the groups
    /// that were dropped for having no members.
    pub fn normalize(&mut self) -> Vec<String> {
        let snapshot = self.groups.clone();
        let mut dropped = Vec::new();

        for (group, members) in &mut self.groups {
            let mut visiting = BTreeSet::new();
            members.extend(reachable_tags(&snapshot, group, &mut visiting));
        }
        self.groups.retain(|group, members| {
            if members.is_empty() {
                dropped.push(group.clone());
                false
            } else {
                true
            }
        });
        dropped
    }

    /// Add every group whose members intersect `tags` to `tags`.
    pub fn apply(&self, tags: &mut TagSet) {
        let matched: Vec<String> = self
            .groups
            .iter()
            .filter(|(_, members)| members.iter().any(|member| tags.contains(member)))
            .map(|(group, _)| group.clone())
            .collect();
        tags.extend(matched);
    }

    /// Merge another table into this one.
    pub fn merge(&mut self, other: Self) {
        for (group, members) in other.groups {
            self.groups.entry(group).or_default().extend(members);
        }
    }
}

fn reachable_tags(
    groups: &BTreeMap<String, TagSet>,
    start: &str,
    visiting: &mut BTreeSet<String>,
) -> TagSet {
    let mut tags = TagSet::new();
    if !visiting.insert(start.to_owned()) {
        return tags;
    }
    if let Some(members) = groups.get(start) {
        for member in members {
            if groups.contains_key(member) {
                tags.extend(reachable_tags(groups, member, visiting));
            } else {
                tags.insert(member.clone());
            }
        }
    }
    visiting.remove(start);
    tags
}
