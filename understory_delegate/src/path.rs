// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubble path construction.
//!
//! The bubble path is the ancestor chain from a trigger target up to, but not
//! including, the node a handler was bound to. Delegated selectors are tested
//! against each node of the path in order; the bound node itself is handled
//! separately by its non-delegated handlers.
//!
//! ```
//! use understory_delegate::path::bubble_path;
//! use understory_delegate::types::{ParentLookup, SelectorMatch};
//!
//! struct Chain;
//! impl ParentLookup<u32> for Chain {
//!     fn parent_of(&self, node: &u32) -> Option<u32> {
//!         node.checked_sub(1)
//!     }
//! }
//! impl SelectorMatch<u32> for Chain {
//!     type Error = ();
//!     fn matches(&self, _: &u32, _: &str) -> Result<bool, ()> { Ok(false) }
//! }
//!
//! // 3 → 2 → 1, stopping before the bound node 0.
//! assert_eq!(bubble_path(&Chain, 3, 0).as_slice(), &[3, 2, 1]);
//! assert!(bubble_path(&Chain, 0, 0).is_empty());
//! ```

use smallvec::SmallVec;

use crate::types::{ParentLookup, SelectorMatch};

/// Target→bound ancestor chain, bound node excluded.
pub type BubblePath<K> = SmallVec<[K; 8]>;

/// Build the bubble path from `target` up to `bound`.
///
/// - Empty when `target == bound`.
/// - `target` is the first element only if the host reports it as matchable;
///   otherwise the walk starts at its parent.
/// - If `bound` is not an ancestor of `target`, the walk ends at the root.
pub fn bubble_path<K, H>(host: &H, target: K, bound: K) -> BubblePath<K>
where
    K: Copy + Eq,
    H: ParentLookup<K> + SelectorMatch<K> + ?Sized,
{
    let mut out = BubblePath::new();
    if target == bound {
        return out;
    }
    let mut cur = if host.is_matchable(&target) {
        Some(target)
    } else {
        host.parent_of(&target)
    };
    // Caller ensures acyclic ancestry.
    while let Some(node) = cur {
        if node == bound {
            break;
        }
        out.push(node);
        cur = host.parent_of(&node);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Dom, Node};

    #[test]
    fn path_excludes_bound_node() {
        let mut dom = Dom::new();
        let a = dom.element(None, &[]);
        let b = dom.element(Some(a), &[]);
        let c = dom.element(Some(b), &[]);
        assert_eq!(bubble_path(&dom, c, a).as_slice(), &[c, b]);
        assert_eq!(bubble_path(&dom, b, a).as_slice(), &[b]);
    }

    #[test]
    fn target_equal_to_bound_is_empty() {
        let mut dom = Dom::new();
        let a = dom.element(None, &[]);
        assert!(bubble_path(&dom, a, a).is_empty());
    }

    #[test]
    fn unmatchable_target_starts_at_parent() {
        let mut dom = Dom::new();
        let a = dom.element(None, &[]);
        let b = dom.element(Some(a), &[]);
        let t = dom.text(b);
        assert_eq!(bubble_path(&dom, t, a).as_slice(), &[b]);
        // Text directly under the bound node leaves nothing to bubble from.
        let t2 = dom.text(a);
        assert!(bubble_path(&dom, t2, a).is_empty());
    }

    #[test]
    fn unrelated_bound_walks_to_root() {
        let mut dom = Dom::new();
        let root = dom.element(None, &[]);
        let child = dom.element(Some(root), &[]);
        let other = dom.element(None, &[]);
        let path: &[Node] = &bubble_path(&dom, child, other);
        assert_eq!(path, &[child, root]);
    }
}
