// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delegated clicks on a list.
//!
//! One handler bound to the list reacts to clicks on any item, however deep
//! inside the item the click lands. A `once` handler and the `ReturnFalse`
//! sentinel show the remaining attach modes.
//!
//! Run:
//! - `cargo run -p understory_demos --example delegate_basics`
//! - `RUST_LOG=understory_delegate=trace cargo run -p understory_demos --example delegate_basics`

use std::error::Error;

use tracing_subscriber::EnvFilter;
use understory_delegate::delegator::Delegator;
use understory_delegate::handler::{AttachOptions, Callback, DetachOptions, Handler};
use understory_delegate::types::{OccurrenceSource, Outcome, ParentLookup, SelectorMatch};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
struct Node(usize);

struct Element {
    parent: Option<Node>,
    tag: &'static str,
    class: Option<&'static str>,
}

/// A flat element tree. Selectors are a tag name or a single `.class`.
#[derive(Default)]
struct Tree {
    nodes: Vec<Element>,
    listening: Vec<(Node, String)>,
}

impl Tree {
    fn add(
        &mut self,
        parent: Option<Node>,
        tag: &'static str,
        class: Option<&'static str>,
    ) -> Node {
        self.nodes.push(Element { parent, tag, class });
        Node(self.nodes.len() - 1)
    }
}

impl ParentLookup<Node> for Tree {
    fn parent_of(&self, node: &Node) -> Option<Node> {
        self.nodes[node.0].parent
    }
}

impl SelectorMatch<Node> for Tree {
    type Error = String;

    fn is_matchable(&self, node: &Node) -> bool {
        self.nodes[node.0].tag != "#text"
    }

    fn matches(&self, node: &Node, selector: &str) -> Result<bool, String> {
        let el = &self.nodes[node.0];
        match selector.strip_prefix('.') {
            Some("") => Err(String::from("empty class selector")),
            Some(class) => Ok(el.class == Some(class)),
            None if selector.chars().all(|c| c.is_ascii_alphanumeric()) => Ok(el.tag == selector),
            None => Err(format!("unsupported selector `{selector}`")),
        }
    }
}

impl OccurrenceSource<Node> for Tree {
    fn subscribe(&mut self, node: &Node, event_type: &str) {
        println!("  [source] listen {event_type} on {node:?}");
        self.listening.push((*node, event_type.to_string()));
    }

    fn unsubscribe(&mut self, node: &Node, event_type: &str) {
        println!("  [source] stop {event_type} on {node:?}");
        self.listening.retain(|(n, t)| !(n == node && t == event_type));
    }
}

type Log = Vec<String>;
type ListHandler = Handler<Node, Tree, Log, &'static str>;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("understory_delegate=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    // ul.menu > li.item × 3; the middle item holds span.label > #text.
    let mut tree = Tree::default();
    let list = tree.add(None, "ul", Some("menu"));
    let items: Vec<Node> = (0..3)
        .map(|_| tree.add(Some(list), "li", Some("item")))
        .collect();
    let label = tree.add(Some(items[1]), "span", Some("label"));
    let text = tree.add(Some(label), "#text", None);
    let form = tree.add(None, "form", None);

    let mut d: Delegator<Node, Tree, Log, &'static str> = Delegator::new(tree);

    let on_item = ListHandler::new(|ev| {
        let line = format!(
            "{} on {:?} (target {:?}, bound {:?})",
            ev.data(),
            ev.current_target(),
            ev.target(),
            ev.delegate_target()
        );
        ev.payload_mut().push(line);
        Ok(Outcome::Continue)
    });
    println!("== Attach ==");
    d.on(
        list,
        AttachOptions::new("click").selector("li").data("item handler"),
        &on_item,
    );
    d.one(
        list,
        AttachOptions::new("click").data("list handler"),
        ListHandler::new(|ev| {
            let line = format!("{} (first click only)", ev.data());
            ev.payload_mut().push(line);
            Ok(Outcome::Continue)
        }),
    );

    let mut log = Log::new();
    for round in 1..=2 {
        log.clear();
        let report = d.dispatch(list, "click", text, &mut log)?;
        println!("== Click {round}: {} handler(s) ==", report.invoked);
        for line in &log {
            println!("  {line}");
        }
    }
    assert_eq!(log, ["item handler on Node(2) (target Node(5), bound Node(0))"]);

    println!("== Detach item handler ==");
    d.off(
        list,
        DetachOptions::types("click").selector("li").callback(&on_item),
    );
    log.clear();
    let report = d.dispatch(list, "click", text, &mut log)?;
    assert_eq!(report.invoked, 0);

    println!("== Cancel submit ==");
    d.on(form, AttachOptions::new("submit.validation"), Callback::ReturnFalse);
    let report = d.dispatch(form, "submit", form, &mut log)?;
    println!("  default prevented: {}", report.is_default_prevented());
    d.off(form, DetachOptions::types(".validation"));
    let report = d.dispatch(form, "submit", form, &mut log)?;
    println!("  default prevented: {}", report.is_default_prevented());

    println!("== Still listening ==\n  {:?}", d.host().listening);
    Ok(())
}
