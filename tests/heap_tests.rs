use semispace::{
    common::options::GcOptionsBuilder,
    gc::{Handle, HandleScope, Heap, HeapItem, HeapItemKind, Memory, HEAP_ITEM_ALIGNMENT},
    runtime::{Globals, NumberValue, RecordObject, StringValue, Value},
};

#[test]
fn alloc_size_is_rounded_to_alignment() {
    assert_eq!(Heap::alloc_size_for_request_size(0), Some(0));
    assert_eq!(Heap::alloc_size_for_request_size(1), Some(8));
    assert_eq!(Heap::alloc_size_for_request_size(8), Some(8));
    assert_eq!(Heap::alloc_size_for_request_size(19), Some(24));
    assert_eq!(HEAP_ITEM_ALIGNMENT, 8);
}

#[test]
fn alloc_size_overflow() {
    assert_eq!(Heap::alloc_size_for_request_size(usize::MAX - 7), Some(usize::MAX - 7));
    assert_eq!(Heap::alloc_size_for_request_size(usize::MAX - 6), None);
    assert_eq!(Heap::alloc_size_for_request_size(usize::MAX), None);
}

#[test]
fn capacity_is_rounded_down_to_alignment() {
    let heap = Heap::new(100);
    assert_eq!(heap.capacity(), 96);
    assert_eq!(heap.free_bytes(), 96);
    assert!(heap.is_empty());
}

#[test]
#[should_panic]
fn zero_capacity_heap() {
    Heap::new(4);
}

#[test]
fn bump_allocation() {
    let mut heap = Heap::new(64);

    let first = heap.alloc(16);
    let second = heap.alloc(24);

    assert_eq!(second.addr() - first.addr(), 16);
    assert_eq!(heap.bytes_allocated(), 40);
    assert_eq!(heap.free_bytes(), 24);
    assert!(heap.contains(first.as_ptr()));
    assert!(heap.contains(second.as_ptr()));
}

#[test]
fn can_alloc_exact_remaining_space() {
    let mut heap = Heap::new(64);
    heap.alloc(40);

    assert!(heap.can_alloc(24));
    assert!(!heap.can_alloc(32));

    heap.alloc(24);
    assert!(heap.can_alloc(0));
    assert!(!heap.can_alloc(8));
}

#[test]
#[should_panic]
fn alloc_without_room() {
    let mut heap = Heap::new(32);
    heap.alloc(24);
    heap.alloc(16);
}

#[test]
fn reset_discards_contents() {
    let mut heap = Heap::new(64);
    let first = heap.alloc(16);
    heap.alloc(16);

    heap.reset();

    assert!(heap.is_empty());
    assert_eq!(heap.bytes_allocated(), 0);
    assert!(heap.first().is_none());

    // Allocation starts over at the beginning of the heap
    assert_eq!(heap.alloc(8).addr(), first.addr());
}

#[test]
fn contains_only_reserved_region() {
    let heap = Heap::new(64);
    let mut other = Heap::new(64);
    let local = 0u8;

    assert!(!heap.contains(&local as *const u8));

    // Two separate reservations never overlap
    let ptr = other.alloc(8);
    assert!(!heap.contains(ptr.as_ptr()));
}

#[test]
fn iterate_in_allocation_order() {
    let mut memory = Memory::new(Globals::new(), GcOptionsBuilder::new().heap_size(1024).build());

    HandleScope::new(&mut memory, |memory| {
        let number = NumberValue::new(memory, 1.5).unwrap();
        let name = StringValue::new(memory, "point").unwrap();
        let three = Value::smi(3).to_handle(memory.handles_mut());
        RecordObject::new(memory, name, &[number.into(), three]).unwrap();
    });

    let heap = memory.active_heap();
    let kinds = heap.iter().map(|item| item.kind()).collect::<Vec<_>>();
    assert_eq!(kinds, vec![HeapItemKind::Number, HeapItemKind::String, HeapItemKind::Record]);

    // Number (16) + string (16 + 5 rounded to 24) + record (24 + 2 fields)
    assert_eq!(heap.bytes_allocated(), 16 + 24 + 40);

    // Walk manually with first and next
    let first = heap.first().unwrap();
    let second = heap.next(first).unwrap();
    let third = heap.next(second).unwrap();
    assert_eq!(second.addr() - first.addr(), 16);
    assert_eq!(third.addr() - second.addr(), 24);
    assert!(heap.next(third).is_none());
}

#[test]
fn item_sizes() {
    let mut memory = Memory::new((), GcOptionsBuilder::new().heap_size(1024).build());
    memory.handles_mut().enter_scope();

    let number = NumberValue::new(&mut memory, 0.0).unwrap();
    let empty = StringValue::new(&mut memory, "").unwrap();
    let name = StringValue::new(&mut memory, "abc").unwrap();
    let record = RecordObject::new_with_nil_fields(&mut memory, name, 4).unwrap();

    assert_eq!(size_of_item(number), 16);
    assert_eq!(size_of_item(empty), 16);
    assert_eq!(size_of_item(name), 24);
    assert_eq!(size_of_item(record), 56);
    assert_eq!(memory.active_heap().bytes_allocated(), 16 + 16 + 24 + 56);

    memory.handles_mut().exit_scope();
}

fn size_of_item<T>(handle: Handle<T>) -> usize {
    Heap::alloc_size_for_item_size(handle.get_value().as_pointer().byte_size())
}
