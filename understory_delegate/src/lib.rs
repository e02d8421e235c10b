// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_delegate --heading-base-level=0

//! Understory Delegate: hierarchical event delegation for UI trees.
//!
//! ## Overview
//!
//! Handlers are attached to a node (the *bound* node) for one or more event
//! types, optionally scoped by a selector. When an occurrence reaches the
//! bound node, the [`Delegator`](crate::delegator::Delegator) replays it along
//! the [bubble path](crate::path::bubble_path) from the originating target up
//! to the bound node, invoking each delegated handler at every path node its
//! selector matches, then invokes the bound node's own handlers.
//!
//! The crate does not know what a node or a selector is. A
//! [`Host`](crate::types::Host) supplies the tree
//! ([`ParentLookup`](crate::types::ParentLookup)), selector evaluation
//! ([`SelectorMatch`](crate::types::SelectorMatch)), and the raw occurrence
//! source ([`OccurrenceSource`](crate::types::OccurrenceSource)) that the
//! delegator subscribes to when a node gets its first handler for a type.
//!
//! ## Ordering
//!
//! - Path nodes are visited innermost first.
//! - At each path node, selectors are tested in the order they were first
//!   registered; records under one selector run in registration order.
//! - Delegated handlers run before the bound node's direct handlers.
//!
//! ## Propagation
//!
//! A handler returns an [`Outcome`](crate::types::Outcome). `StopPropagation`
//! (or the [`ReturnFalse`](crate::handler::Callback::ReturnFalse) sentinel)
//! stops the cycle and prevents the default action; both signals are also
//! available separately on [`Event`](crate::event::Event). Nothing runs after a
//! stop, not even the rest of the current handler list.
//!
//! ## Re-entrancy
//!
//! Handlers receive `&mut Delegator` through their [`Event`](crate::event::Event)
//! and may attach, detach, or dispatch while a cycle runs. Each cycle works on
//! a snapshot taken at its start.
//!
//! ## Example
//!
//! ```
//! use understory_delegate::delegator::Delegator;
//! use understory_delegate::handler::{AttachOptions, DetachOptions, Handler};
//! use understory_delegate::types::{OccurrenceSource, Outcome, ParentLookup, SelectorMatch};
//!
//! // 0 is the root; every other node's parent is n - 1.
//! // Odd nodes carry the class `odd`.
//! struct Line;
//! impl ParentLookup<u32> for Line {
//!     fn parent_of(&self, node: &u32) -> Option<u32> {
//!         node.checked_sub(1)
//!     }
//! }
//! impl SelectorMatch<u32> for Line {
//!     type Error = ();
//!     fn matches(&self, node: &u32, selector: &str) -> Result<bool, ()> {
//!         match selector {
//!             ".odd" => Ok(node % 2 == 1),
//!             _ => Err(()),
//!         }
//!     }
//! }
//! impl OccurrenceSource<u32> for Line {
//!     fn subscribe(&mut self, _: &u32, _: &str) {}
//!     fn unsubscribe(&mut self, _: &u32, _: &str) {}
//! }
//!
//! let mut d: Delegator<u32, Line, Vec<u32>> = Delegator::new(Line);
//! let on_odd = Handler::<u32, Line, Vec<u32>, ()>::new(|ev| {
//!     let current = ev.current_target();
//!     ev.payload_mut().push(current);
//!     Ok(Outcome::Continue)
//! });
//! d.on(0, AttachOptions::new("click").selector(".odd"), &on_odd);
//!
//! let mut seen = Vec::new();
//! d.dispatch(0, "click", 4, &mut seen).unwrap();
//! assert_eq!(seen, [3, 1]);
//!
//! d.off(0, DetachOptions::types("click").callback(&on_odd));
//! assert!(!d.has_handlers(&0, "click"));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod delegator;
pub mod error;
pub mod event;
pub mod handler;
pub mod names;
pub mod path;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testing;
