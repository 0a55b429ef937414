use semispace::{
    common::{error::AllocError, options::GcOptionsBuilder},
    gc::{Handle, HandleScope, Memory},
    runtime::{NumberValue, RecordObject, StringValue, Value},
};

fn new_memory(max_handles: usize) -> Memory<()> {
    let options = GcOptionsBuilder::new().heap_size(1024).max_handles(max_handles).build();
    Memory::new((), options)
}

#[test]
fn exiting_scope_discards_its_handles() {
    let mut memory = new_memory(16);
    let handles = memory.handles_mut();

    handles.enter_scope();
    for i in 0..3 {
        handles.new_handle::<Value>(Value::smi(i));
    }

    handles.enter_scope();
    handles.new_handle::<Value>(Value::nil());
    handles.new_handle::<Value>(Value::nil());
    assert_eq!(handles.len(), 5);
    assert_eq!(handles.scope_depth(), 2);

    handles.exit_scope();
    assert_eq!(handles.len(), 3);
    assert_eq!(handles.scope_depth(), 1);

    handles.exit_scope();
    assert_eq!(handles.len(), 0);
    assert_eq!(handles.scope_depth(), 0);
}

#[test]
fn handles_track_relocation() {
    let mut memory = new_memory(16);
    memory.handles_mut().enter_scope();

    let number = NumberValue::new(&mut memory, 2.5).unwrap();
    let before = number.get_();

    memory.collect();

    let after = number.get_();
    assert_ne!(before, after);
    assert!(memory.active_heap().contains(after.as_ptr().cast_const().cast()));
    assert_eq!(number.value(), 2.5);

    memory.handles_mut().exit_scope();
}

#[test]
fn handles_are_roots_only_while_their_scope_is_open() {
    let mut memory = new_memory(16);

    // Handle in an outer scope that stays open for the whole test
    memory.handles_mut().enter_scope();
    let outer = StringValue::new(&mut memory, "outer").unwrap();

    HandleScope::new(&mut memory, |memory| {
        for i in 0..4 {
            NumberValue::new(memory, i as f64).unwrap();
        }

        // Inner handles are live while the scope is open
        memory.collect();
        assert_eq!(memory.verify_heap(), 5);
    });

    memory.collect();

    assert_eq!(memory.verify_heap(), 1);
    assert_eq!(outer.as_str(), "outer");

    memory.handles_mut().exit_scope();
    memory.collect();
    assert!(memory.active_heap().is_empty());
}

#[test]
fn base_scope_handles_live_until_shutdown() {
    let mut memory = new_memory(16);

    let number = NumberValue::new(&mut memory, 8.0).unwrap();
    assert_eq!(memory.handles().scope_depth(), 0);

    for _ in 0..3 {
        memory.collect();
    }

    assert_eq!(number.value(), 8.0);
    assert_eq!(memory.verify_heap(), 1);

    memory.shut_down();
}

#[test]
fn escaped_handle_survives_scope() {
    let mut memory = new_memory(16);
    memory.handles_mut().enter_scope();

    let record = HandleScope::new(&mut memory, |memory| {
        let name = StringValue::new(memory, "escaped").unwrap();
        let number = NumberValue::new(memory, 1.0).unwrap();
        RecordObject::new(memory, name, &[number.into()]).unwrap()
    });

    // Only the escaped handle remains
    assert_eq!(memory.handles().len(), 1);

    memory.collect();

    assert_eq!(record.name().as_str(), "escaped");
    assert_eq!(record.get_field(0).as_pointer().cast::<NumberValue>().value(), 1.0);
    assert_eq!(memory.verify_heap(), 3);

    memory.handles_mut().exit_scope();
}

#[test]
fn escape_result() {
    let mut memory = new_memory(16);
    memory.handles_mut().enter_scope();

    let ok: Result<Handle<NumberValue>, AllocError> = HandleScope::new(&mut memory, |memory| {
        NumberValue::new(memory, 3.0)?;
        NumberValue::new(memory, 4.0)
    });
    assert_eq!(memory.handles().len(), 1);
    assert_eq!(ok.unwrap().value(), 4.0);

    let err: Result<Handle<NumberValue>, AllocError> = HandleScope::new(&mut memory, |_| {
        Err(AllocError::OutOfMemory { requested: 8, available: 0 })
    });
    assert!(err.is_err());
    assert_eq!(memory.handles().len(), 1);

    memory.handles_mut().exit_scope();
}

#[test]
fn escape_immediate_value() {
    let mut memory = new_memory(16);

    let value = HandleScope::new(&mut memory, |memory| {
        NumberValue::new(memory, 3.0).unwrap();
        Value::smi(3)
    });

    assert_eq!(value, Value::smi(3));
    assert_eq!(memory.handles().len(), 0);
}

#[test]
#[should_panic(expected = "Heap pointers must escape a scope in a handle")]
fn escape_bare_pointer_value() {
    let mut memory = new_memory(16);

    HandleScope::new(&mut memory, |memory| NumberValue::new(memory, 3.0).unwrap().get_value());
}

#[test]
fn replacing_handle_contents() {
    let mut memory = new_memory(16);
    memory.handles_mut().enter_scope();

    let mut slot = Value::nil().to_handle(memory.handles_mut());
    let copy = slot;
    assert!(slot.is_nil());

    let number = NumberValue::new(&mut memory, 6.0).unwrap();
    slot.replace(number.get_value());

    // Copies of a handle share its slot
    assert_eq!(copy.get(), number.get_value());

    memory.collect();
    assert_eq!(copy.get(), number.get_value());
    assert_eq!(copy.as_pointer().cast::<NumberValue>().value(), 6.0);

    memory.handles_mut().exit_scope();
}

#[test]
#[should_panic(expected = "Exceeded maximum of 2 live temporary handles")]
fn too_many_handles() {
    let mut memory = new_memory(2);

    for _ in 0..3 {
        Value::nil().to_handle(memory.handles_mut());
    }
}

#[test]
#[should_panic(expected = "no scope was open")]
fn exit_scope_without_enter() {
    let mut memory = new_memory(2);
    memory.handles_mut().exit_scope();
}
