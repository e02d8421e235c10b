// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for delegation: outcomes, dispatch flags, and the host seams.
//!
//! ## Overview
//!
//! The engine never walks a tree, evaluates a selector, or talks to a native
//! event source on its own. It asks the host through three small traits:
//!
//! - [`ParentLookup`] for one-step ancestry,
//! - [`SelectorMatch`] for structural predicates,
//! - [`OccurrenceSource`] to start and stop listening for raw occurrences.
//!
//! Any type implementing all three is a [`Host`] and can drive a
//! [`Delegator`](crate::delegator::Delegator).

/// Handler outcome controlling propagation.
///
/// Returned by every handler. [`StopPropagation`](Outcome::StopPropagation)
/// halts the current dispatch cycle and also marks the default action as
/// prevented; use [`Event::stop_propagation`](crate::event::Event::stop_propagation)
/// or [`Event::prevent_default`](crate::event::Event::prevent_default) to set
/// only one of the two.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Keep invoking handlers.
    Continue,
    /// Stop the cycle and prevent the default action.
    StopPropagation,
}

bitflags::bitflags! {
    /// Propagation state of one dispatch cycle.
    ///
    /// Carried by [`PropagationControl`](crate::event::PropagationControl) while the
    /// cycle runs and reported back in
    /// [`DispatchReport`](crate::delegator::DispatchReport).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DispatchFlags: u8 {
        /// No further handler runs in this cycle.
        const PROPAGATION_STOPPED = 0b0000_0001;
        /// The host should skip its default action for the occurrence.
        const DEFAULT_PREVENTED   = 0b0000_0010;
    }
}

impl Default for DispatchFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Look up the parent of a node to walk the bubble path.
///
/// Consulted by [`bubble_path`](crate::path::bubble_path) on every dispatch
/// that has delegated handlers.
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// Structural predicate used to scope delegated handlers.
///
/// The engine does not define selector syntax. Whatever the host accepts as a
/// selector string is passed through verbatim.
pub trait SelectorMatch<K> {
    /// Error reported for selectors the host cannot evaluate.
    ///
    /// Handlers report failures with the same type, so a host has one error
    /// channel for both.
    type Error;

    /// Whether `node` can be tested against selectors at all.
    ///
    /// Text-like nodes usually cannot. Defaults to `true`.
    fn is_matchable(&self, node: &K) -> bool {
        let _ = node;
        true
    }

    /// Returns whether `node` matches `selector`.
    fn matches(&self, node: &K, selector: &str) -> Result<bool, Self::Error>;
}

/// Hook into the host's raw occurrence source.
///
/// [`subscribe`](Self::subscribe) fires when a node gains its first handler
/// for a type, [`unsubscribe`](Self::unsubscribe) when it loses its last one.
/// Calls for one `(node, type)` pair always alternate.
pub trait OccurrenceSource<K> {
    /// Start delivering raw `event_type` occurrences for `node`.
    fn subscribe(&mut self, node: &K, event_type: &str);
    /// Stop delivering raw `event_type` occurrences for `node`.
    fn unsubscribe(&mut self, node: &K, event_type: &str);
}

/// Everything a [`Delegator`](crate::delegator::Delegator) needs from its host.
///
/// Implemented automatically for any type implementing [`ParentLookup`],
/// [`SelectorMatch`] and [`OccurrenceSource`].
pub trait Host<K>: ParentLookup<K> + SelectorMatch<K> + OccurrenceSource<K> {}

impl<K, T> Host<K> for T where T: ParentLookup<K> + SelectorMatch<K> + OccurrenceSource<K> {}

/// Error type reported by a host's matcher and by its handlers.
pub type HostError<K, H> = <H as SelectorMatch<K>>::Error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_is_empty() {
        let f = DispatchFlags::default();
        assert!(f.is_empty());
        assert!(!f.contains(DispatchFlags::PROPAGATION_STOPPED));
    }

    #[test]
    fn flags_are_independent() {
        let mut f = DispatchFlags::default();
        f.insert(DispatchFlags::DEFAULT_PREVENTED);
        assert!(f.contains(DispatchFlags::DEFAULT_PREVENTED));
        assert!(!f.contains(DispatchFlags::PROPAGATION_STOPPED));
    }

    #[test]
    fn matchable_defaults_to_true() {
        struct AnyMatch;
        impl SelectorMatch<u32> for AnyMatch {
            type Error = ();
            fn matches(&self, _node: &u32, _selector: &str) -> Result<bool, ()> {
                Ok(true)
            }
        }
        assert!(AnyMatch.is_matchable(&7));
        assert_eq!(AnyMatch.matches(&7, "x"), Ok(true));
    }
}
