// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_delegate::delegator::Delegator;
use understory_delegate::handler::{AttachOptions, DetachOptions, Handler};
use understory_delegate::types::{OccurrenceSource, Outcome, ParentLookup, SelectorMatch};

const CLASSES: [&str; 4] = ["row", "cell", "item", "label"];

/// A single chain: node `i` is the parent of `i + 1`, with class `CLASSES[i % 4]`.
struct Chain;

impl ParentLookup<u32> for Chain {
    fn parent_of(&self, node: &u32) -> Option<u32> {
        node.checked_sub(1)
    }
}

impl SelectorMatch<u32> for Chain {
    type Error = ();

    fn matches(&self, node: &u32, selector: &str) -> Result<bool, ()> {
        let class = selector.strip_prefix('.').ok_or(())?;
        Ok(CLASSES[*node as usize % CLASSES.len()] == class)
    }
}

impl OccurrenceSource<u32> for Chain {
    fn subscribe(&mut self, _: &u32, _: &str) {}
    fn unsubscribe(&mut self, _: &u32, _: &str) {}
}

type Counter = Handler<u32, Chain, u64, ()>;

fn counter() -> Counter {
    Counter::new(|ev| {
        *ev.payload_mut() += 1;
        Ok(Outcome::Continue)
    })
}

fn bench_dispatch_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_depth");
    for &depth in &[8_u32, 32, 128] {
        let mut d: Delegator<u32, Chain, u64> = Delegator::new(Chain);
        d.on(0, AttachOptions::new("click").selector(".row"), counter());
        d.on(0, AttachOptions::new("click"), counter());
        group.throughput(Throughput::Elements(u64::from(depth)));
        group.bench_function(format!("one_selector_n{}", depth), |b| {
            b.iter(|| {
                let mut hits = 0_u64;
                let report = d.dispatch(0, "click", depth - 1, &mut hits);
                black_box((report, hits));
            });
        });
    }
    group.finish();
}

fn bench_dispatch_selectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_selectors");
    let mut d: Delegator<u32, Chain, u64> = Delegator::new(Chain);
    for class in CLASSES {
        for _ in 0..4 {
            d.on(
                0,
                AttachOptions::new("click").selector(format!(".{class}")),
                counter(),
            );
        }
    }
    group.bench_function("four_selectors_n64", |b| {
        b.iter(|| {
            let mut hits = 0_u64;
            let report = d.dispatch(0, "click", 63, &mut hits);
            black_box((report, hits));
        });
    });
    group.bench_function("namespaced_miss_n64", |b| {
        b.iter(|| {
            let mut hits = 0_u64;
            let report = d.dispatch(0, "click.none", 63, &mut hits);
            black_box((report, hits));
        });
    });
    group.finish();
}

fn bench_attach_detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("attach_detach");
    let handlers: Vec<Counter> = (0..256).map(|_| counter()).collect();
    group.throughput(Throughput::Elements(handlers.len() as u64));
    group.bench_function("on_off_256", |b| {
        b.iter_batched(
            || Delegator::<u32, Chain, u64>::new(Chain),
            |mut d| {
                for (i, h) in handlers.iter().enumerate() {
                    let node = (i % 16) as u32;
                    d.on(node, AttachOptions::new("click keyup.ns").selector(".item"), h);
                }
                for (i, h) in handlers.iter().enumerate() {
                    let node = (i % 16) as u32;
                    d.off(node, DetachOptions::types("click").callback(h));
                }
                d.off(0, DetachOptions::types(".ns"));
                black_box(d);
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_dispatch_depth,
    bench_dispatch_selectors,
    bench_attach_detach,
);
criterion_main!(benches);
