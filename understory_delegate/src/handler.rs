// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handlers, handler records, and the per-call option structs.
//!
//! ## Identity
//!
//! A [`Handler`] is a shared closure. Cloning it shares the closure, and two
//! handlers are the same handler for removal purposes iff they share it
//! (pointer identity). Keep a clone of whatever you pass to
//! [`Delegator::on`](crate::delegator::Delegator::on) if you intend to detach
//! it selectively later.
//!
//! [`Callback::ReturnFalse`] is a canonical handler that always stops
//! propagation. Every use of the sentinel is the same handler, so it can be
//! detached without keeping anything around.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::fmt;

use crate::event::Event;
use crate::names::Namespaces;
use crate::types::{Host, HostError, Outcome};

/// Signature of a handler closure.
pub type HandlerFn<K, H, P, D> =
    dyn Fn(&mut Event<'_, K, H, P, D>) -> Result<Outcome, HostError<K, H>>;

/// A shared, identity-comparable handler closure.
pub struct Handler<K, H: Host<K>, P, D> {
    func: Rc<HandlerFn<K, H, P, D>>,
}

impl<K, H: Host<K>, P, D> Handler<K, H, P, D> {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Event<'_, K, H, P, D>) -> Result<Outcome, HostError<K, H>> + 'static,
    {
        Self { func: Rc::new(f) }
    }

    /// Whether `self` and `other` share the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    pub(crate) fn call(
        &self,
        event: &mut Event<'_, K, H, P, D>,
    ) -> Result<Outcome, HostError<K, H>> {
        (self.func)(event)
    }
}

impl<K, H: Host<K>, P, D> Clone for Handler<K, H, P, D> {
    fn clone(&self) -> Self {
        Self {
            func: Rc::clone(&self.func),
        }
    }
}

impl<K, H: Host<K>, P, D> fmt::Debug for Handler<K, H, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}

/// What a record invokes.
pub enum Callback<K, H: Host<K>, P, D> {
    /// A user closure.
    Handler(Handler<K, H, P, D>),
    /// The canonical "always cancel" handler.
    ReturnFalse,
}

impl<K, H: Host<K>, P, D> Callback<K, H, P, D> {
    /// Whether both denote the same handler.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            (Self::ReturnFalse, Self::ReturnFalse) => true,
            _ => false,
        }
    }
}

impl<K, H: Host<K>, P, D> Clone for Callback<K, H, P, D> {
    fn clone(&self) -> Self {
        match self {
            Self::Handler(h) => Self::Handler(h.clone()),
            Self::ReturnFalse => Self::ReturnFalse,
        }
    }
}

impl<K, H: Host<K>, P, D> fmt::Debug for Callback<K, H, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(h) => h.fmt(f),
            Self::ReturnFalse => f.write_str("ReturnFalse"),
        }
    }
}

impl<K, H: Host<K>, P, D> From<Handler<K, H, P, D>> for Callback<K, H, P, D> {
    fn from(h: Handler<K, H, P, D>) -> Self {
        Self::Handler(h)
    }
}

impl<K, H: Host<K>, P, D> From<&Handler<K, H, P, D>> for Callback<K, H, P, D> {
    fn from(h: &Handler<K, H, P, D>) -> Self {
        Self::Handler(h.clone())
    }
}

/// One registered callback.
///
/// Records are immutable once attached, apart from the internal flag that
/// marks a `once` record as spent.
pub struct HandlerRecord<K, H: Host<K>, P, D> {
    pub(crate) id: u64,
    pub(crate) callback: Callback<K, H, P, D>,
    pub(crate) data: D,
    pub(crate) once: bool,
    pub(crate) spent: Cell<bool>,
    pub(crate) namespaces: Namespaces,
}

impl<K, H: Host<K>, P, D> HandlerRecord<K, H, P, D> {
    /// Unique id assigned at attach time.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The callback this record invokes.
    pub fn callback(&self) -> &Callback<K, H, P, D> {
        &self.callback
    }

    /// Data passed to the callback unchanged.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Whether the record detaches itself on first invocation.
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Namespaces the record was attached with.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Mark a `once` record as spent; returns `false` if it already was.
    pub(crate) fn claim(&self) -> bool {
        !self.spent.replace(true)
    }
}

impl<K, H: Host<K>, P, D: fmt::Debug> fmt::Debug for HandlerRecord<K, H, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRecord")
            .field("id", &self.id)
            .field("callback", &self.callback)
            .field("data", &self.data)
            .field("once", &self.once)
            .field("spent", &self.spent.get())
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

/// Options for [`Delegator::on`](crate::delegator::Delegator::on).
///
/// ```
/// use understory_delegate::handler::AttachOptions;
/// let opts: AttachOptions<u8> = AttachOptions::new("click keyup")
///     .selector(".item")
///     .data(7)
///     .once(true);
/// assert_eq!(opts.selector.as_deref(), Some(".item"));
/// ```
#[derive(Clone, Debug)]
pub struct AttachOptions<D> {
    /// Space-separated event type list, each token `name[.ns…]`.
    pub event_types: String,
    /// Delegation selector; `None` or `""` binds directly to the node.
    pub selector: Option<String>,
    /// Data passed to the callback on every invocation.
    pub data: D,
    /// Detach after the first invocation.
    pub once: bool,
}

impl<D: Default> AttachOptions<D> {
    /// Non-delegated, repeating attachment with default data.
    pub fn new(event_types: impl Into<String>) -> Self {
        Self {
            event_types: event_types.into(),
            selector: None,
            data: D::default(),
            once: false,
        }
    }
}

impl<D> AttachOptions<D> {
    /// Scope the handler to descendants matching `selector`.
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Set the data passed to the callback.
    pub fn data(mut self, data: D) -> Self {
        self.data = data;
        self
    }

    /// Set whether the handler detaches after its first invocation.
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}

/// Options for [`Delegator::off`](crate::delegator::Delegator::off).
///
/// Every field narrows the removal; the default removes everything on the node.
pub struct DetachOptions<K, H: Host<K>, P, D> {
    /// Space-separated event type list; `None` selects every type.
    pub event_types: Option<String>,
    /// Selector key; `None` selects every key, `Some("")` only direct records.
    pub selector: Option<String>,
    /// Callback identity; `None` selects every callback.
    pub callback: Option<Callback<K, H, P, D>>,
}

impl<K, H: Host<K>, P, D> DetachOptions<K, H, P, D> {
    /// Remove every handler of every type.
    pub fn all() -> Self {
        Self {
            event_types: None,
            selector: None,
            callback: None,
        }
    }

    /// Remove handlers of the listed types.
    pub fn types(event_types: impl Into<String>) -> Self {
        Self {
            event_types: Some(event_types.into()),
            ..Self::all()
        }
    }

    /// Limit removal to one selector key.
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Limit removal to one callback.
    pub fn callback(mut self, callback: impl Into<Callback<K, H, P, D>>) -> Self {
        self.callback = Some(callback.into());
        self
    }
}

impl<K, H: Host<K>, P, D> Default for DetachOptions<K, H, P, D> {
    fn default() -> Self {
        Self::all()
    }
}

impl<K, H: Host<K>, P, D> fmt::Debug for DetachOptions<K, H, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachOptions")
            .field("event_types", &self.event_types)
            .field("selector", &self.selector)
            .field("callback", &self.callback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Dom, Log, Node, TestCallback, TestDetach, TestHandler};
    use alloc::format;

    fn noop() -> TestHandler {
        TestHandler::new(|_| Ok(Outcome::Continue))
    }

    #[test]
    fn clones_share_identity() {
        let a = noop();
        let b = noop();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn callback_identity() {
        let a = noop();
        let ca: TestCallback = Callback::from(&a);
        assert!(ca.same_as(&Callback::Handler(a.clone())));
        assert!(!ca.same_as(&Callback::ReturnFalse));
        let rf: TestCallback = Callback::ReturnFalse;
        assert!(rf.same_as(&Callback::ReturnFalse));
    }

    #[test]
    fn attach_defaults() {
        let opts: AttachOptions<u32> = AttachOptions::new("click");
        assert!(opts.selector.is_none());
        assert_eq!(opts.data, 0);
        assert!(!opts.once);
    }

    #[test]
    fn detach_builders_narrow() {
        let h = noop();
        let opts: TestDetach = DetachOptions::types("click").selector(".a").callback(&h);
        assert_eq!(opts.event_types.as_deref(), Some("click"));
        assert_eq!(opts.selector.as_deref(), Some(".a"));
        assert!(opts.callback.is_some_and(|c| c.same_as(&Callback::from(h))));
        let all = TestDetach::default();
        assert!(all.event_types.is_none());
        assert!(all.selector.is_none());
        assert!(all.callback.is_none());
    }

    #[test]
    fn record_debug_shows_spent_state() {
        let rec: HandlerRecord<Node, Dom, Log, u32> = HandlerRecord {
            id: 1,
            callback: Callback::ReturnFalse,
            data: 7,
            once: true,
            spent: Cell::new(false),
            namespaces: Namespaces::new(),
        };
        assert!(format!("{rec:?}").contains("spent: false"));
        assert!(rec.claim());
        assert!(!rec.claim());
        assert!(format!("{rec:?}").contains("spent: true"));
    }
}
