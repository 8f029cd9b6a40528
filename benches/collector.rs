use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use cyclerc::{Collector, Ref, Trace};

struct Node {
    value: u64,
    next: Ref<Node>,
}

impl Node {
    fn new(value: u64) -> Self {
        Self {
            value,
            next: Ref::empty(),
        }
    }
}

impl Trace for Node {
    fn trace(&mut self, visit: &mut dyn FnMut(&mut Ref<Self>)) {
        visit(&mut self.next);
    }
}

fn build_chain(collector: &mut Collector<Node>, len: usize) {
    let mut tail = collector.add_root(Node::new(0));
    for value in 1..len {
        let node = collector.add(Node::new(value as u64));
        tail.borrow_mut().next = node.clone();
        tail = node;
    }
}

fn bench_alloc(c: &mut Criterion) {
    c.bench_function("add/100", |b| {
        b.iter(|| {
            let mut collector = Collector::new();
            let mut total = 0;
            for value in 0..100 {
                let handle = collector.add(Node::new(value));
                total += handle.borrow().value;
            }
            black_box(total)
        });
    });
}

fn bench_mark_and_sweep(c: &mut Criterion) {
    c.bench_function("mark_and_sweep/chain_1000", |b| {
        let mut collector = Collector::new();
        build_chain(&mut collector, 1000);
        b.iter(|| collector.mark_and_sweep());
    });

    c.bench_function("mark_and_sweep/cycles_100", |b| {
        b.iter_batched(
            || {
                let mut collector = Collector::new();
                for value in 0..100 {
                    let first = collector.add(Node::new(value));
                    let second = collector.add(Node::new(value));
                    first.borrow_mut().next = second.clone();
                    second.borrow_mut().next = first.clone();
                }
                collector
            },
            |mut collector| {
                collector.mark_and_sweep();
                black_box(collector.count_live())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_organize(c: &mut Criterion) {
    c.bench_function("organize/half_dead_1000", |b| {
        b.iter_batched(
            || {
                let mut collector = Collector::new();
                let mut kept = Vec::new();
                for value in 0..1000 {
                    let handle = collector.add(Node::new(value));
                    if value % 2 == 0 {
                        kept.push(handle);
                    }
                }
                (collector, kept)
            },
            |(mut collector, kept)| {
                collector.organize();
                black_box(kept)
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_alloc, bench_mark_and_sweep, bench_organize);
criterion_main!(benches);
