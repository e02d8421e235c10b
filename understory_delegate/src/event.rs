// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler context and per-cycle propagation control.
//!
//! Every handler receives an [`Event`]: the node it matched, the occurrence
//! payload, its record data, the cycle's [`PropagationControl`], and mutable
//! access to the [`Delegator`] itself for re-entrant `on`/`off`/`dispatch`.

use core::fmt;

use crate::delegator::{Delegator, DispatchReport};
use crate::error::DispatchError;
use crate::types::{DispatchFlags, Host, HostError};

/// Mutable propagation state for one dispatch cycle.
///
/// Created at the start of [`Delegator::dispatch`] and dropped at its end;
/// nested cycles get their own.
#[derive(Clone, Debug, Default)]
pub struct PropagationControl {
    flags: DispatchFlags,
}

impl PropagationControl {
    /// Fresh state: nothing stopped, nothing prevented.
    pub fn new() -> Self {
        Self::default()
    }

    /// No further handler runs in this cycle.
    pub fn stop_propagation(&mut self) {
        self.flags.insert(DispatchFlags::PROPAGATION_STOPPED);
    }

    /// Ask the host to skip its default action.
    pub fn prevent_default(&mut self) {
        self.flags.insert(DispatchFlags::DEFAULT_PREVENTED);
    }

    /// Whether [`stop_propagation`](Self::stop_propagation) was requested.
    pub fn is_propagation_stopped(&self) -> bool {
        self.flags.contains(DispatchFlags::PROPAGATION_STOPPED)
    }

    /// Whether [`prevent_default`](Self::prevent_default) was requested.
    pub fn is_default_prevented(&self) -> bool {
        self.flags.contains(DispatchFlags::DEFAULT_PREVENTED)
    }

    /// Current flags.
    pub fn flags(&self) -> DispatchFlags {
        self.flags
    }
}

/// Context passed to a handler invocation.
pub struct Event<'a, K, H: Host<K>, P, D> {
    pub(crate) delegator: &'a mut Delegator<K, H, P, D>,
    pub(crate) control: &'a mut PropagationControl,
    pub(crate) payload: &'a mut P,
    pub(crate) data: &'a D,
    pub(crate) event_type: &'a str,
    pub(crate) target: K,
    pub(crate) current: K,
    pub(crate) bound: K,
}

impl<'a, K: Copy, H: Host<K>, P, D> Event<'a, K, H, P, D> {
    /// Node the occurrence originated from.
    pub fn target(&self) -> K {
        self.target
    }

    /// Node the handler matched: a bubble path node for delegated handlers,
    /// the bound node otherwise.
    pub fn current_target(&self) -> K {
        self.current
    }

    /// Node the handler was attached to.
    pub fn delegate_target(&self) -> K {
        self.bound
    }

    /// Event type name of this cycle, without namespaces.
    pub fn event_type(&self) -> &'a str {
        self.event_type
    }

    /// Data the handler was attached with.
    pub fn data(&self) -> &'a D {
        self.data
    }

    /// Occurrence payload.
    pub fn payload(&self) -> &P {
        &*self.payload
    }

    /// Occurrence payload, mutably.
    pub fn payload_mut(&mut self) -> &mut P {
        &mut *self.payload
    }

    /// The delegator running this cycle.
    ///
    /// Attaching during a cycle never adds to the running cycle; detaching
    /// never removes records it already snapshotted.
    pub fn delegator(&mut self) -> &mut Delegator<K, H, P, D> {
        &mut *self.delegator
    }

    /// Stop the cycle without preventing the default action.
    pub fn stop_propagation(&mut self) {
        self.control.stop_propagation();
    }

    /// Prevent the default action without stopping the cycle.
    pub fn prevent_default(&mut self) {
        self.control.prevent_default();
    }

    /// Whether the cycle has been stopped.
    pub fn is_propagation_stopped(&self) -> bool {
        self.control.is_propagation_stopped()
    }

    /// Whether the default action has been prevented.
    pub fn is_default_prevented(&self) -> bool {
        self.control.is_default_prevented()
    }
}

impl<K, H, P, D> Event<'_, K, H, P, D>
where
    K: Copy + Eq + core::hash::Hash + fmt::Debug,
    H: Host<K>,
{
    /// Run a nested dispatch cycle with this cycle's payload.
    ///
    /// The nested cycle has its own snapshot and its own propagation state.
    pub fn dispatch(
        &mut self,
        bound: K,
        event_type: &str,
        target: K,
    ) -> Result<DispatchReport, DispatchError<HostError<K, H>>> {
        self.delegator
            .dispatch(bound, event_type, target, &mut *self.payload)
    }
}

impl<K: fmt::Debug, H: Host<K>, P, D> fmt::Debug for Event<'_, K, H, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("target", &self.target)
            .field("current", &self.current)
            .field("bound", &self.bound)
            .field("flags", &self.control.flags())
            .finish_non_exhaustive()
    }
}
