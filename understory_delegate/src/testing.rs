// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small element/text tree used as the host in unit tests.
//!
//! Selectors are `*` (any element) or `.class`; anything else is rejected
//! with [`TestError::BadSelector`].

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::delegator::Delegator;
use crate::handler::{Callback, DetachOptions, Handler};
use crate::types::{OccurrenceSource, Outcome, ParentLookup, SelectorMatch};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Node(pub(crate) u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TestError {
    BadSelector(String),
    Handler(&'static str),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSelector(s) => write!(f, "bad selector {s}"),
            Self::Handler(s) => write!(f, "handler error {s}"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Sub {
    On,
    Off,
}

struct NodeData {
    parent: Option<Node>,
    classes: &'static [&'static str],
    text: bool,
}

#[derive(Default)]
pub(crate) struct Dom {
    nodes: Vec<NodeData>,
    /// Every subscribe/unsubscribe call, in order.
    pub(crate) subs: Vec<(Sub, Node, String)>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn element(
        &mut self,
        parent: Option<Node>,
        classes: &'static [&'static str],
    ) -> Node {
        self.push(parent, classes, false)
    }

    pub(crate) fn text(&mut self, parent: Node) -> Node {
        self.push(Some(parent), &[], true)
    }

    fn push(
        &mut self,
        parent: Option<Node>,
        classes: &'static [&'static str],
        text: bool,
    ) -> Node {
        let id = Node(u32::try_from(self.nodes.len()).unwrap());
        self.nodes.push(NodeData {
            parent,
            classes,
            text,
        });
        id
    }

    pub(crate) fn subs_for(&self, node: Node) -> Vec<(Sub, &str)> {
        self.subs
            .iter()
            .filter(|(_, n, _)| *n == node)
            .map(|(s, _, t)| (*s, t.as_str()))
            .collect()
    }
}

impl ParentLookup<Node> for Dom {
    fn parent_of(&self, node: &Node) -> Option<Node> {
        self.nodes[node.0 as usize].parent
    }
}

impl SelectorMatch<Node> for Dom {
    type Error = TestError;

    fn is_matchable(&self, node: &Node) -> bool {
        !self.nodes[node.0 as usize].text
    }

    fn matches(&self, node: &Node, selector: &str) -> Result<bool, TestError> {
        let data = &self.nodes[node.0 as usize];
        if selector == "*" {
            return Ok(!data.text);
        }
        match selector.strip_prefix('.') {
            Some(class) if !class.is_empty() => Ok(data.classes.iter().any(|c| *c == class)),
            _ => Err(TestError::BadSelector(String::from(selector))),
        }
    }
}

impl OccurrenceSource<Node> for Dom {
    fn subscribe(&mut self, node: &Node, event_type: &str) {
        self.subs.push((Sub::On, *node, String::from(event_type)));
    }

    fn unsubscribe(&mut self, node: &Node, event_type: &str) {
        self.subs.push((Sub::Off, *node, String::from(event_type)));
    }
}

/// Handlers append `(name, current target)` to the payload.
pub(crate) type Log = Vec<(&'static str, Node)>;
pub(crate) type TestDelegator = Delegator<Node, Dom, Log, u32>;
pub(crate) type TestHandler = Handler<Node, Dom, Log, u32>;
pub(crate) type TestCallback = Callback<Node, Dom, Log, u32>;
pub(crate) type TestDetach = DetachOptions<Node, Dom, Log, u32>;

/// A handler that logs its name and current target, then continues.
pub(crate) fn recorder(name: &'static str) -> TestHandler {
    TestHandler::new(move |ev| {
        let current = ev.current_target();
        ev.payload_mut().push((name, current));
        Ok(Outcome::Continue)
    })
}

/// A handler that logs like [`recorder`] and then returns `outcome`.
pub(crate) fn returning(name: &'static str, outcome: Outcome) -> TestHandler {
    TestHandler::new(move |ev| {
        let current = ev.current_target();
        ev.payload_mut().push((name, current));
        Ok(outcome)
    })
}
