use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use semispace::{
    common::options::GcOptionsBuilder,
    gc::{HandleScope, Memory},
    runtime::{Globals, NumberValue, RecordObject, StringValue, Value},
};

const NUM_NODES: usize = 10_000;

fn setup_memory() -> Memory<Globals> {
    // Use a 4 MB heap size
    let options = GcOptionsBuilder::new().heap_size(4 * 1024 * 1024).build();
    Memory::new(Globals::new(), options)
}

/// Build a linked list of records, rooting every other node on the stack.
fn build_list(memory: &mut Memory<Globals>) {
    for i in 0..NUM_NODES {
        HandleScope::new(memory, |memory| {
            let name = StringValue::new(memory, "node").unwrap();
            let number = NumberValue::new(memory, i as f64).unwrap();
            let previous = memory.roots().stack().last().copied().unwrap_or(Value::nil());
            let previous = previous.to_handle(memory.handles_mut());

            let node = RecordObject::new(memory, name, &[number.into(), previous]).unwrap();
            if i % 2 == 0 {
                memory.roots_mut().push(node.get_value());
            }
        });
    }
}

fn bench_allocation(c: &mut Criterion) {
    c.bench_function("allocate linked records", |b| {
        b.iter_batched(setup_memory, |mut memory| build_list(&mut memory), BatchSize::PerIteration)
    });
}

fn bench_collection(c: &mut Criterion) {
    c.bench_function("collect linked records", |b| {
        b.iter_batched(
            || {
                let mut memory = setup_memory();
                build_list(&mut memory);
                memory
            },
            |mut memory| memory.collect(),
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_allocation, bench_collection);
criterion_main!(benches);
