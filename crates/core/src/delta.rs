// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Set difference between the authoritative directory and the managed users.

use std::collections::HashSet;

use crate::entry::{is_valid_identifier, Kind, TransactionEntry};

/// Identifiers that must gain or lose the entitlement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// In the authoritative set but not managed.
    pub add: Vec<String>,
    /// Managed but no longer in the authoritative set.
    pub remove: Vec<String>,
}

impl Delta {
    /// Computes `authoritative - managed` and `managed - authoritative`.
    ///
    /// Both outputs are deduplicated and keep the first-occurrence order of
    /// their source list. Identifiers shorter than two characters are
    /// discarded on both sides.
    pub fn compute<A, M>(authoritative: &[A], managed: &[M]) -> Delta
    where
        A: AsRef<str>,
        M: AsRef<str>,
    {
        let wanted = filtered(authoritative);
        let held = filtered(managed);

        let wanted_set: HashSet<&str> = wanted.iter().copied().collect();
        let held_set: HashSet<&str> = held.iter().copied().collect();

        Delta {
            add: difference(&wanted, &held_set),
            remove: difference(&held, &wanted_set),
        }
    }

    /// Returns true if the two sets already agree.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Total number of changes.
    pub fn len(&self) -> usize {
        self.add.len() + self.remove.len()
    }

    /// Flattens the delta into queue entries, adds first.
    pub fn entries(&self) -> Vec<TransactionEntry> {
        self.add
            .iter()
            .map(|id| TransactionEntry::new(id.clone(), Kind::Add))
            .chain(
                self.remove
                    .iter()
                    .map(|id| TransactionEntry::new(id.clone(), Kind::Remove)),
            )
            .collect()
    }
}

/// Drops malformed identifiers and duplicates, preserving order.
fn filtered<S: AsRef<str>>(ids: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(AsRef::as_ref)
        .filter(|id| is_valid_identifier(id))
        .filter(|id| seen.insert(*id))
        .collect()
}

fn difference(from: &[&str], exclude: &HashSet<&str>) -> Vec<String> {
    from.iter()
        .filter(|id| !exclude.contains(*id))
        .map(|id| id.to_string())
        .collect()
}

#[cfg(test)]
#[path = "delta_tests.rs"]
mod tests;
