// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event type names.
//!
//! An event type list is a space-separated sequence of tokens, each of the form
//! `name[.ns1[.ns2…]]`. The name selects the bucket; namespaces tag records so
//! that callers can detach or trigger a subset without holding the callbacks.
//!
//! ```
//! use understory_delegate::names::parse_list;
//! let tokens: Vec<_> = parse_list("click.menu keyup").collect();
//! assert_eq!(tokens[0].name(), "click");
//! assert_eq!(tokens[0].namespaces(), &["menu"]);
//! assert_eq!(tokens[1].name(), "keyup");
//! ```

use alloc::string::String;

use smallvec::SmallVec;

/// Namespaces carried by a record, in the order they were written.
pub type Namespaces = SmallVec<[String; 2]>;

/// One parsed token of an event type list, borrowed from the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeToken<'a> {
    name: &'a str,
    namespaces: SmallVec<[&'a str; 2]>,
}

impl<'a> TypeToken<'a> {
    /// Parse a single token. Empty namespace segments are dropped.
    pub fn parse(token: &'a str) -> Self {
        let mut parts = token.split('.');
        let name = parts.next().unwrap_or_default();
        let namespaces = parts.filter(|ns| !ns.is_empty()).collect();
        Self { name, namespaces }
    }

    /// Event type name; empty for namespace-only tokens such as `.menu`.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Namespaces listed after the name.
    pub fn namespaces(&self) -> &[&'a str] {
        &self.namespaces
    }

    /// Owned copy of the namespaces, as stored on a record.
    pub fn to_namespaces(&self) -> Namespaces {
        self.namespaces.iter().map(|ns| String::from(*ns)).collect()
    }

    /// Whether a record tagged with `tags` is selected by this token.
    ///
    /// Every namespace of the token must be present on the record; a token
    /// without namespaces selects everything.
    pub fn selects(&self, tags: &[String]) -> bool {
        self.namespaces
            .iter()
            .all(|ns| tags.iter().any(|t| t == ns))
    }
}

/// Split a space-separated event type list into tokens.
pub fn parse_list(list: &str) -> impl Iterator<Item = TypeToken<'_>> {
    list.split_whitespace().map(TypeToken::parse)
}
