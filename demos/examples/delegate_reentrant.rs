// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handlers that reshape the delegator while a cycle runs.
//!
//! A tab strip selects tabs through a delegated handler that fires a nested
//! `select` cycle on the panel, a rate-limited handler detaches itself by
//! namespace, and a selector the host cannot evaluate surfaces as an error.
//!
//! Run:
//! - `cargo run -p understory_demos --example delegate_reentrant`

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use understory_delegate::delegator::Delegator;
use understory_delegate::error::DispatchError;
use understory_delegate::handler::{AttachOptions, DetachOptions, Handler};
use understory_delegate::types::{OccurrenceSource, Outcome, ParentLookup, SelectorMatch};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
struct Node(usize);

/// Nodes are `(parent, class)`; only `.class` selectors are understood.
struct Tabs(Vec<(Option<Node>, &'static str)>);

impl ParentLookup<Node> for Tabs {
    fn parent_of(&self, node: &Node) -> Option<Node> {
        self.0[node.0].0
    }
}

impl SelectorMatch<Node> for Tabs {
    type Error = String;

    fn matches(&self, node: &Node, selector: &str) -> Result<bool, String> {
        selector
            .strip_prefix('.')
            .map(|class| self.0[node.0].1 == class)
            .ok_or_else(|| format!("cannot evaluate `{selector}`"))
    }
}

impl OccurrenceSource<Node> for Tabs {
    fn subscribe(&mut self, _: &Node, _: &str) {}
    fn unsubscribe(&mut self, _: &Node, _: &str) {}
}

#[derive(Debug, Default)]
struct App {
    selected: Option<Node>,
    log: Vec<String>,
}

type TabHandler = Handler<Node, Tabs, App, ()>;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("understory_delegate=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    // strip > tab × 3, strip > panel
    let strip = Node(0);
    let tabs = [Node(1), Node(2), Node(3)];
    let panel = Node(4);
    let host = Tabs(vec![
        (None, "strip"),
        (Some(strip), "tab"),
        (Some(strip), "tab"),
        (Some(strip), "tab"),
        (Some(strip), "panel"),
    ]);
    let mut d: Delegator<Node, Tabs, App> = Delegator::new(host);

    // Selecting a tab re-enters the delegator with a `select` cycle on the panel.
    d.on(
        strip,
        AttachOptions::new("click").selector(".tab"),
        TabHandler::new(move |ev| {
            let tab = ev.current_target();
            ev.payload_mut().selected = Some(tab);
            let inner = ev
                .dispatch(panel, "select", panel)
                .map_err(DispatchError::into_inner)?;
            let line = format!(
                "tab {tab:?} selected, panel stopped: {}",
                inner.is_propagation_stopped()
            );
            ev.payload_mut().log.push(line);
            Ok(Outcome::Continue)
        }),
    );
    d.on(
        panel,
        AttachOptions::new("select"),
        TabHandler::new(|ev| {
            let line = format!("panel shows {:?}", ev.payload().selected);
            ev.payload_mut().log.push(line);
            Ok(Outcome::StopPropagation)
        }),
    );
    d.on(
        panel,
        AttachOptions::new("select"),
        TabHandler::new(|ev| {
            ev.payload_mut().log.push(String::from("never reached"));
            Ok(Outcome::Continue)
        }),
    );

    // Counts clicks and removes itself, by namespace, after the second one.
    let clicks = Rc::new(Cell::new(0_u32));
    let counter = {
        let clicks = Rc::clone(&clicks);
        TabHandler::new(move |ev| {
            clicks.set(clicks.get() + 1);
            if clicks.get() == 2 {
                let bound = ev.delegate_target();
                ev.delegator().off(bound, DetachOptions::types("click.limited"));
            }
            Ok(Outcome::Continue)
        })
    };
    d.on(strip, AttachOptions::new("click.limited"), counter);

    let mut app = App::default();
    for tab in [tabs[0], tabs[2], tabs[1]] {
        d.dispatch(strip, "click", tab, &mut app)?;
    }
    println!("== Log ==");
    for line in &app.log {
        println!("  {line}");
    }
    println!("== Counter saw {} click(s) ==", clicks.get());
    assert_eq!(clicks.get(), 2);
    assert_eq!(app.selected, Some(tabs[1]));

    println!("== Unsupported selector ==");
    d.on(
        strip,
        AttachOptions::new("click").selector("[disabled]"),
        TabHandler::new(|_| Ok(Outcome::Continue)),
    );
    match d.dispatch(strip, "click", tabs[0], &mut app) {
        Err(err @ DispatchError::Selector { .. }) => println!("  {err}"),
        other => println!("  unexpected: {other:?}"),
    }
    d.off(strip, DetachOptions::types("click").selector("[disabled]"));
    d.dispatch(strip, "click", tabs[0], &mut app)?;
    Ok(())
}
