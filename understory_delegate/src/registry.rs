// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node handler storage.
//!
//! ## Layout
//!
//! A [`HandlerRegistry`] maps event type names to [`SelectorBucket`]s. A bucket
//! maps selector keys to records in registration order. The empty key `""`
//! holds non-delegated records.
//!
//! ## Pruning
//!
//! Storage never holds empty containers:
//!
//! - removing the last record of a selector key deletes the key,
//! - removing the last key deletes the bucket.
//!
//! [`HandlerRegistry::remove`] reports when a bucket disappears so the caller
//! can retract its raw occurrence subscription.
//!
//! Both types are generic over the record so they can be exercised without
//! handler closures. The delegator stores shared `Rc` records here and
//! snapshots them by cloning the pointers.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

/// The selector key used for non-delegated records.
pub const DIRECT: &str = "";

/// Records for one `(node, event type)` pair, grouped by selector key.
///
/// Keys keep the order in which they were first registered, which is the
/// order selectors are tested at each bubble path node.
#[derive(Clone, Debug)]
pub struct SelectorBucket<R> {
    entries: Vec<(String, Vec<R>)>,
}

impl<R> Default for SelectorBucket<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<R> SelectorBucket<R> {
    /// Append a record under `selector`.
    pub fn push(&mut self, selector: &str, record: R) {
        match self.entries.iter_mut().find(|(k, _)| k == selector) {
            Some((_, records)) => records.push(record),
            None => self.entries.push((String::from(selector), vec![record])),
        }
    }

    /// Records stored under `selector`, in registration order.
    pub fn records(&self, selector: &str) -> &[R] {
        self.entries
            .iter()
            .find(|(k, _)| k == selector)
            .map(|(_, records)| records.as_slice())
            .unwrap_or_default()
    }

    /// Non-delegated records, in registration order.
    pub fn direct(&self) -> &[R] {
        self.records(DIRECT)
    }

    /// Delegated selector keys and their records, in key order.
    pub fn delegated(&self) -> impl Iterator<Item = (&str, &[R])> + '_ {
        self.entries
            .iter()
            .filter(|(k, _)| k != DIRECT)
            .map(|(k, records)| (k.as_str(), records.as_slice()))
    }

    /// All selector keys, in key order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Whether any delegated key is present.
    pub fn has_delegated(&self) -> bool {
        self.entries.iter().any(|(k, _)| k != DIRECT)
    }

    /// Total number of records across all keys.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    /// Whether the bucket holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every record accepted by `pred`, optionally limited to one key.
    ///
    /// Returns the number of records removed. Keys left empty are deleted.
    pub fn remove_where(
        &mut self,
        selector: Option<&str>,
        mut pred: impl FnMut(&R) -> bool,
    ) -> usize {
        let mut removed = 0;
        for (key, records) in &mut self.entries {
            if selector.is_some_and(|s| s != key.as_str()) {
                continue;
            }
            let before = records.len();
            records.retain(|r| !pred(r));
            removed += before - records.len();
        }
        self.entries.retain(|(_, records)| !records.is_empty());
        removed
    }
}

/// Result of [`HandlerRegistry::remove`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Removal {
    /// Number of records removed.
    pub removed: usize,
    /// Whether the bucket for the event type was deleted by this removal.
    pub bucket_emptied: bool,
}

/// Per-node map from event type name to [`SelectorBucket`].
#[derive(Clone, Debug)]
pub struct HandlerRegistry<R> {
    buckets: HashMap<String, SelectorBucket<R>>,
}

impl<R> Default for HandlerRegistry<R> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<R> HandlerRegistry<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` under `(event_type, selector)`.
    ///
    /// Returns `true` when this created the bucket for `event_type`.
    pub fn insert(&mut self, event_type: &str, selector: &str, record: R) -> bool {
        let created = !self.buckets.contains_key(event_type);
        self.buckets
            .entry(String::from(event_type))
            .or_default()
            .push(selector, record);
        created
    }

    /// Bucket for `event_type`, if any record is registered for it.
    pub fn bucket(&self, event_type: &str) -> Option<&SelectorBucket<R>> {
        self.buckets.get(event_type)
    }

    /// Remove records of `event_type` accepted by `pred`.
    ///
    /// `selector` limits removal to one key; `None` considers every key.
    /// Unknown types and unmatched records are a no-op.
    pub fn remove(
        &mut self,
        event_type: &str,
        selector: Option<&str>,
        pred: impl FnMut(&R) -> bool,
    ) -> Removal {
        let Some(bucket) = self.buckets.get_mut(event_type) else {
            return Removal::default();
        };
        let removed = bucket.remove_where(selector, pred);
        let bucket_emptied = bucket.is_empty();
        if bucket_emptied {
            self.buckets.remove(event_type);
        }
        Removal {
            removed,
            bucket_emptied,
        }
    }

    /// Event type names with at least one record, in no particular order.
    pub fn event_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.keys().map(String::as_str)
    }

    /// Total number of records across all types.
    pub fn len(&self) -> usize {
        self.buckets.values().map(SelectorBucket::len).sum()
    }

    /// Whether no type has any record.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
