// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delegator implementation.
//!
//! ## Overview
//!
//! Owns one [`HandlerRegistry`] per node (created on first attach) and runs
//! dispatch cycles over them.
//!
//! ## Dispatch cycle
//!
//! 1. Look up the bound node's bucket for the event type; none means no-op.
//! 2. Snapshot the delegated records and the direct records. Handlers attached
//!    during the cycle never join it; handlers detached during the cycle still
//!    run if they were snapshotted.
//! 3. Walk the [bubble path](crate::path::bubble_path). At each node, test every
//!    delegated selector in key order and invoke matching records in
//!    registration order.
//! 4. Invoke the direct records with the bound node as current target.
//!
//! Propagation state is checked before every invocation. A handler error or a
//! matcher error aborts the cycle immediately.
//!
//! ## Once
//!
//! A `once` record is claimed and detached right before it runs, so it runs at
//! most once even when its own handler re-enters dispatch on the same node.
//!
//! ## See Also
//!
//! [`Event`] for what handlers can do from inside a cycle.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::error::DispatchError;
use crate::event::{Event, PropagationControl};
use crate::handler::{AttachOptions, Callback, DetachOptions, HandlerRecord};
use crate::names::{TypeToken, parse_list};
use crate::path::bubble_path;
use crate::registry::{DIRECT, HandlerRegistry, SelectorBucket};
use crate::types::{DispatchFlags, Host, HostError, Outcome};

/// A handler record as stored in registries and dispatch snapshots.
pub type Record<K, H, P, D> = Rc<HandlerRecord<K, H, P, D>>;

/// Delegated records of one cycle, by selector key in key order.
type Snapshot<K, H, P, D> = SmallVec<[(String, Vec<Record<K, H, P, D>>); 4]>;

/// Summary of one dispatch cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Propagation state at the end of the cycle.
    pub flags: DispatchFlags,
    /// Number of handler invocations.
    pub invoked: usize,
}

impl DispatchReport {
    /// Whether a handler stopped the cycle.
    pub fn is_propagation_stopped(&self) -> bool {
        self.flags.contains(DispatchFlags::PROPAGATION_STOPPED)
    }

    /// Whether the host should skip its default action.
    pub fn is_default_prevented(&self) -> bool {
        self.flags.contains(DispatchFlags::DEFAULT_PREVENTED)
    }
}

/// Where a record is being invoked.
#[derive(Copy, Clone)]
struct Site<'s, K> {
    event_type: &'s str,
    selector: &'s str,
    target: K,
    current: K,
    bound: K,
}

/// Hierarchical event delegation engine.
///
/// ## Usage
///
/// - Construct with [`Delegator::new`] around a [`Host`] that knows the tree,
///   evaluates selectors, and owns the raw occurrence source.
/// - Attach with [`Delegator::on`] / [`Delegator::one`], detach with
///   [`Delegator::off`], drop a node's handlers with [`Delegator::remove_node`].
/// - Call [`Delegator::dispatch`] from the raw occurrence source whenever a
///   subscribed type fires on or beneath a node.
///
/// Type parameters: `K` node key, `H` host, `P` occurrence payload, `D` data
/// attached to each record.
pub struct Delegator<K, H: Host<K>, P = (), D = ()> {
    host: H,
    registries: HashMap<K, HandlerRegistry<Record<K, H, P, D>>>,
    next_id: u64,
}

impl<K, H: Host<K>, P, D> fmt::Debug for Delegator<K, H, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegator")
            .field("nodes", &self.registries.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl<K, H, P, D> Delegator<K, H, P, D>
where
    K: Copy + Eq + Hash + fmt::Debug,
    H: Host<K>,
{
    /// Create a delegator with no handlers.
    pub fn new(host: H) -> Self {
        Self {
            host,
            registries: HashMap::new(),
            next_id: 0,
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the delegator and return its host.
    ///
    /// No `unsubscribe` calls are made.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Attach `callback` to `node` for every type in `opts.event_types`.
    ///
    /// One record is appended per listed type; identical attachments are not
    /// deduplicated. The first record of a type on a node subscribes the node
    /// to raw occurrences of that type.
    ///
    /// A `once` record is detached right before its handler runs, so it is
    /// already gone while the handler runs and stays gone if the handler fails.
    pub fn on(
        &mut self,
        node: K,
        opts: AttachOptions<D>,
        callback: impl Into<Callback<K, H, P, D>>,
    ) where
        D: Clone,
    {
        let callback = callback.into();
        let selector = opts.selector.as_deref().unwrap_or(DIRECT);
        for token in parse_list(&opts.event_types) {
            let event_type = token.name();
            if event_type.is_empty() {
                warn!(
                    ?node,
                    types = %opts.event_types,
                    "ignoring event type token without a name"
                );
                continue;
            }
            let record = Rc::new(HandlerRecord {
                id: self.next_id(),
                callback: callback.clone(),
                data: opts.data.clone(),
                once: opts.once,
                spent: Cell::new(false),
                namespaces: token.to_namespaces(),
            });
            let created = self
                .registries
                .entry(node)
                .or_default()
                .insert(event_type, selector, record);
            debug!(
                ?node,
                event_type,
                selector,
                once = opts.once,
                "attached handler"
            );
            if created {
                debug!(?node, event_type, "subscribing to raw occurrences");
                self.host.subscribe(&node, event_type);
            }
        }
    }

    /// [`on`](Self::on) with `once` forced on.
    ///
    /// The record is detached before its handler runs, even if the handler
    /// then fails.
    pub fn one(
        &mut self,
        node: K,
        opts: AttachOptions<D>,
        callback: impl Into<Callback<K, H, P, D>>,
    ) where
        D: Clone,
    {
        self.on(node, opts.once(true), callback);
    }

    /// Detach handlers from `node`.
    ///
    /// Each field of `opts` narrows the removal. Removing records that were
    /// never attached is a no-op. Types left without records unsubscribe the
    /// node from their raw occurrences.
    pub fn off(&mut self, node: K, opts: DetachOptions<K, H, P, D>) {
        let Some(registry) = self.registries.get_mut(&node) else {
            return;
        };
        let selector = opts.selector.as_deref();
        let callback = opts.callback.as_ref();
        let mut removed = 0;
        let mut emptied: SmallVec<[String; 4]> = SmallVec::new();
        let tokens: SmallVec<[TypeToken<'_>; 4]> = match opts.event_types.as_deref() {
            Some(list) => parse_list(list).collect(),
            None => smallvec::smallvec![TypeToken::parse("")],
        };
        for token in &tokens {
            let types: SmallVec<[String; 4]> = if token.name().is_empty() {
                registry.event_types().map(String::from).collect()
            } else {
                smallvec::smallvec![String::from(token.name())]
            };
            for event_type in types {
                let r = registry.remove(&event_type, selector, |rec| {
                    callback.is_none_or(|c| c.same_as(&rec.callback))
                        && token.selects(&rec.namespaces)
                });
                removed += r.removed;
                if r.bucket_emptied {
                    emptied.push(event_type);
                }
            }
        }
        debug!(?node, removed, ?selector, "detached handlers");
        for event_type in emptied {
            debug!(?node, event_type = %event_type, "unsubscribing from raw occurrences");
            self.host.unsubscribe(&node, &event_type);
        }
    }

    /// Drop every handler on `node` and its registry.
    ///
    /// Call this before discarding a node; registries are otherwise kept for
    /// the lifetime of the delegator.
    pub fn remove_node(&mut self, node: K) {
        let Some(registry) = self.registries.remove(&node) else {
            return;
        };
        debug!(?node, handlers = registry.len(), "removing node registry");
        for event_type in registry.event_types() {
            self.host.unsubscribe(&node, event_type);
        }
    }

    /// Number of records on `node` for `event_type`.
    pub fn handler_count(&self, node: &K, event_type: &str) -> usize {
        self.bucket(node, event_type).map_or(0, SelectorBucket::len)
    }

    /// Whether `node` has any record for `event_type`.
    pub fn has_handlers(&self, node: &K, event_type: &str) -> bool {
        self.bucket(node, event_type).is_some()
    }

    /// Whether `node` has a registry, even an empty one.
    pub fn has_registry(&self, node: &K) -> bool {
        self.registries.contains_key(node)
    }

    /// Event types with records on `node`, sorted.
    pub fn event_types(&self, node: &K) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .registries
            .get(node)
            .map(|r| r.event_types().collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    /// Records on `node` for `event_type`, grouped by selector key.
    pub fn bucket(
        &self,
        node: &K,
        event_type: &str,
    ) -> Option<&SelectorBucket<Record<K, H, P, D>>> {
        self.registries.get(node)?.bucket(event_type)
    }

    /// Run one dispatch cycle.
    ///
    /// `bound` is the node whose handlers run, `target` the node the
    /// occurrence originated from (`bound` itself or a descendant). If
    /// `event_type` carries namespaces, only records tagged with all of them
    /// run.
    pub fn dispatch(
        &mut self,
        bound: K,
        event_type: &str,
        target: K,
        payload: &mut P,
    ) -> Result<DispatchReport, DispatchError<HostError<K, H>>> {
        let token = TypeToken::parse(event_type.trim());
        let name = token.name();
        let mut report = DispatchReport::default();
        let Some(bucket) = self.bucket(&bound, name) else {
            trace!(?bound, event_type = name, "no handlers");
            return Ok(report);
        };

        let selected = |records: &[Record<K, H, P, D>]| -> Vec<Record<K, H, P, D>> {
            records
                .iter()
                .filter(|r| token.selects(&r.namespaces))
                .cloned()
                .collect()
        };
        let delegated: Snapshot<K, H, P, D> = if target == bound {
            SmallVec::new()
        } else {
            bucket
                .delegated()
                .map(|(selector, records)| (String::from(selector), selected(records)))
                .filter(|(_, records)| !records.is_empty())
                .collect()
        };
        let direct = selected(bucket.direct());

        let mut control = PropagationControl::new();
        if !delegated.is_empty() {
            let path = bubble_path(&self.host, target, bound);
            trace!(
                ?bound,
                ?target,
                event_type = name,
                path_len = path.len(),
                "walking bubble path"
            );
            'path: for &current in &path {
                for (selector, records) in &delegated {
                    if control.is_propagation_stopped() {
                        break 'path;
                    }
                    let matched = self.host.matches(&current, selector).map_err(|error| {
                        DispatchError::Selector {
                            selector: selector.clone(),
                            error,
                        }
                    })?;
                    if !matched {
                        continue;
                    }
                    let site = Site {
                        event_type: name,
                        selector,
                        target,
                        current,
                        bound,
                    };
                    for record in records {
                        if control.is_propagation_stopped() {
                            break 'path;
                        }
                        report.invoked += self.invoke(record, site, &mut control, payload)?;
                    }
                }
            }
        }

        let site = Site {
            event_type: name,
            selector: DIRECT,
            target,
            current: bound,
            bound,
        };
        for record in &direct {
            if control.is_propagation_stopped() {
                break;
            }
            report.invoked += self.invoke(record, site, &mut control, payload)?;
        }

        report.flags = control.flags();
        trace!(
            ?bound,
            event_type = name,
            invoked = report.invoked,
            flags = ?report.flags,
            "dispatch finished"
        );
        Ok(report)
    }

    /// Invoke one snapshotted record; returns how many invocations happened.
    fn invoke(
        &mut self,
        record: &Record<K, H, P, D>,
        site: Site<'_, K>,
        control: &mut PropagationControl,
        payload: &mut P,
    ) -> Result<usize, DispatchError<HostError<K, H>>> {
        if record.once {
            if !record.claim() {
                return Ok(0);
            }
            self.remove_record(site.bound, site.event_type, site.selector, record.id);
        }
        let outcome = match &record.callback {
            Callback::ReturnFalse => Outcome::StopPropagation,
            Callback::Handler(handler) => {
                let mut event = Event {
                    delegator: self,
                    control: &mut *control,
                    payload,
                    data: &record.data,
                    event_type: site.event_type,
                    target: site.target,
                    current: site.current,
                    bound: site.bound,
                };
                handler
                    .call(&mut event)
                    .map_err(|error| DispatchError::Handler {
                        event_type: String::from(site.event_type),
                        error,
                    })?
            }
        };
        if outcome == Outcome::StopPropagation {
            trace!(
                current = ?site.current,
                event_type = site.event_type,
                "handler stopped propagation"
            );
            control.stop_propagation();
            control.prevent_default();
        }
        Ok(1)
    }

    /// Detach exactly one record, identified by id.
    fn remove_record(&mut self, node: K, event_type: &str, selector: &str, id: u64) {
        let Some(registry) = self.registries.get_mut(&node) else {
            return;
        };
        let r = registry.remove(event_type, Some(selector), |rec| rec.id == id);
        trace!(
            ?node,
            event_type,
            selector,
            id,
            removed = r.removed,
            "detached once handler"
        );
        if r.bucket_emptied {
            debug!(?node, event_type, "unsubscribing from raw occurrences");
            self.host.unsubscribe(&node, event_type);
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
