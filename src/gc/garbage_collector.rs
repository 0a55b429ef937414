use super::{AnyHeapItem, Heap, HeapItem, HeapPtr, HeapVisitor, ItemState};

/// A Cheney-style semispace garbage collector. Copies every item reachable from the roots out of
/// from-space and into to-space, leaving a forwarding pointer behind in from-space.
///
/// To-space is its own worklist. Items are copied to the end of to-space, and the scan walks
/// to-space in allocation order tracing each item until it catches up with the end.
pub struct GarbageCollector<'a> {
    // The region we are copying from
    from_space: &'a Heap,
    // The region we are copying to
    to_space: &'a mut Heap,
    // Number of items copied during this collection
    objects_copied: usize,
}

/// Summary of a single completed collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub objects_copied: usize,
    pub bytes_copied: usize,
    pub bytes_reclaimed: usize,
}

impl<'a> GarbageCollector<'a> {
    pub fn new(from_space: &'a Heap, to_space: &'a mut Heap) -> GarbageCollector<'a> {
        debug_assert!(to_space.is_empty());
        GarbageCollector { from_space, to_space, objects_copied: 0 }
    }

    /// Copy an item into to-space, returning its new location. Idempotent during a collection: if
    /// the item was already copied then its forwarding pointer is returned instead. This is what
    /// keeps shared references shared and terminates cycles.
    pub fn copy(&mut self, item: HeapPtr<AnyHeapItem>) -> HeapPtr<AnyHeapItem> {
        let kind = match item.state() {
            ItemState::Forwarded(new_location) => return new_location,
            ItemState::Live(kind) => kind,
        };

        // Survivors of from-space always fit in to-space since both have the same capacity
        let alloc_size = Heap::alloc_size_for_item_size(item.byte_size_for_kind(kind));
        if !self.to_space.can_alloc(alloc_size) {
            panic!(
                "To-space exhausted while copying a {} byte {:?} item",
                alloc_size, kind
            );
        }

        // Copy item from old to new heap, bumping to-space past the new allocation
        let new_item = self.to_space.alloc(alloc_size).cast::<AnyHeapItem>();
        unsafe {
            std::ptr::copy_nonoverlapping::<u8>(
                item.as_ptr().cast(),
                new_item.as_ptr().cast(),
                alloc_size,
            );
        }

        // Overwrite the header of the old item with a forwarding pointer to the new item
        let mut old_item = item;
        old_item.forward_to(new_item);

        self.objects_copied += 1;

        new_item
    }

    /// Trace every item in to-space in the order it was copied, copying everything it references.
    /// Terminates once the scan reaches the end of to-space, since tracing only ever appends.
    pub fn scan(&mut self) {
        let mut next_item = self.to_space.first();
        while let Some(mut item) = next_item {
            item.visit_pointers(self);
            next_item = self.to_space.next(item);
        }
    }

    /// Finish the collection. Returns a summary of the work done.
    pub fn finish(self) -> CollectionSummary {
        let bytes_copied = self.to_space.bytes_allocated();
        CollectionSummary {
            objects_copied: self.objects_copied,
            bytes_copied,
            bytes_reclaimed: self.from_space.bytes_allocated().saturating_sub(bytes_copied),
        }
    }

    #[inline]
    fn is_in_from_space(&self, ptr: HeapPtr<AnyHeapItem>) -> bool {
        self.from_space.contains(ptr.as_ptr().cast_const().cast())
    }
}

impl HeapVisitor for GarbageCollector<'_> {
    fn visit(&mut self, ptr: &mut HeapPtr<AnyHeapItem>) {
        // Pointers that were already rewritten, e.g. a root slot visited twice, point to to-space
        if !self.is_in_from_space(*ptr) {
            if !self.to_space.contains(ptr.as_ptr().cast_const().cast()) {
                panic!("Pointer {:?} outside of the managed heap during collection", ptr);
            }

            return;
        }

        *ptr = self.copy(*ptr);
    }
}
