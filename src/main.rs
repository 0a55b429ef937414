use std::error::Error;

use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};

use semispace::{
    common::{
        error::{print_error_message_and_exit, AllocResult},
        options::{Args, GcOptions},
    },
    gc::{HandleScope, HeapItemKind, Memory},
    runtime::{BoxedValue, Globals, NumberValue, RecordObject, StringValue, Value},
};

const NODE_NAME: &str = "node";

/// Allocate one random node and store it in a random stack slot, dropping whatever the slot held
/// before. Returns the slot that was written.
fn run_round(
    memory: &mut Memory<Globals>,
    rng: &mut impl Rng,
    id: isize,
    num_slots: usize,
) -> AllocResult<usize> {
    HandleScope::new(memory, |memory| {
        let name = StringValue::new(memory, NODE_NAME)?;

        // Garbage that is never rooted
        for _ in 0..rng.gen_range(0..4) {
            StringValue::new(memory, "garbage")?;
        }

        let num_fields = rng.gen_range(2..6);
        let mut node = RecordObject::new_with_nil_fields(memory, name, num_fields)?;
        node.set_field(0, Value::smi(id));

        let number = NumberValue::new(memory, id as f64)?;
        node.set_field(1, number.get_value());

        for i in 2..num_fields {
            let value = match rng.gen_range(0..4) {
                0 => Value::nil(),
                // Reference back to the node itself
                1 => node.get_value(),
                // Shared reference to another rooted node
                2 => memory.roots().stack()[rng.gen_range(0..num_slots)],
                _ => {
                    let contents = Value::smi(i as isize).to_handle(memory.handles_mut());
                    BoxedValue::new(memory, contents)?.get_value()
                }
            };

            node.set_field(i, value);
        }

        let slot = rng.gen_range(0..num_slots);
        memory.roots_mut().stack_mut()[slot] = node.get_value();

        Ok(slot)
    })
}

/// Check that every rooted node still holds the contents it was created with.
fn verify_nodes(memory: &mut Memory<Globals>, ids: &[Option<isize>]) -> Result<(), Box<dyn Error>> {
    memory.verify_heap();

    for (slot, id) in ids.iter().enumerate() {
        let id = match id {
            Some(id) => *id,
            None => continue,
        };

        let value = memory.roots().stack()[slot];
        if value.heap_kind() != Some(HeapItemKind::Record) {
            return Err(format!("Slot {} does not hold a record: {:?}", slot, value).into());
        }

        let node = value.as_pointer().cast::<RecordObject>();
        if node.name().as_str() != NODE_NAME || node.get_field(0) != Value::smi(id) {
            return Err(format!("Slot {} holds a corrupted node, expected id {}", slot, id).into());
        }

        let number = node.get_field(1).as_pointer().cast::<NumberValue>();
        if number.value() != id as f64 {
            return Err(format!("Node {} has corrupted number {}", id, number.value()).into());
        }
    }

    Ok(())
}

fn main_impl(args: &Args) -> Result<(), Box<dyn Error>> {
    if args.live_objects == 0 {
        return Err("--live-objects must be at least 1".into());
    }

    let options = GcOptions::new_from_args(args);
    let mut memory = Memory::new(Globals::new(), options);
    let mut rng = StdRng::seed_from_u64(args.seed);

    for _ in 0..args.live_objects {
        memory.roots_mut().push(Value::nil());
    }

    let mut ids = vec![None; args.live_objects];
    for round in 0..args.iterations {
        let id = round as isize;
        let slot = run_round(&mut memory, &mut rng, id, args.live_objects)?;
        ids[slot] = Some(id);

        if args.verify {
            verify_nodes(&mut memory, &ids)?;
        }
    }

    // Always collect and verify once at the end
    memory.collect();
    verify_nodes(&mut memory, &ids)?;

    let info = memory.heap_info();
    let stats = *memory.stats();

    println!(
        "{} rounds, {} collections, {} items copied, {} bytes copied, {} bytes reclaimed",
        args.iterations,
        stats.num_collections,
        stats.total_objects_copied,
        stats.total_bytes_copied,
        stats.total_bytes_reclaimed
    );
    println!("{} of {} bytes live after final collection", info.bytes_allocated, info.capacity);

    memory.shut_down();

    Ok(())
}

/// Wrapper to pretty print errors
fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = main_impl(&args) {
        print_error_message_and_exit(&err.to_string());
    }
}
