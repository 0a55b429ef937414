use std::alloc::Layout;

use super::{heap_item::HEAP_ITEM_ALIGNMENT, AnyHeapItem, HeapItem, HeapPtr};

/// A single semispace. A fixed capacity region of memory that is allocated into by bumping a
/// pointer, so live items are laid out contiguously in allocation order.
pub struct Heap {
    /// Pointer to the start of the heap
    start: *mut u8,
    /// Pointer to where the next heap allocation will occur, grows as more allocations occur
    current: *mut u8,
    /// Pointer to the end of the heap
    end: *mut u8,
    layout: Layout,
}

impl Heap {
    /// Reserve a new empty heap with room for `capacity` bytes, rounded down to the allocation
    /// alignment.
    pub fn new(capacity: usize) -> Heap {
        let capacity = capacity & !(HEAP_ITEM_ALIGNMENT - 1);
        assert!(capacity > 0, "Heap capacity must be at least {} bytes", HEAP_ITEM_ALIGNMENT);

        let layout = match Layout::from_size_align(capacity, HEAP_ITEM_ALIGNMENT) {
            Ok(layout) => layout,
            Err(_) => panic!("Invalid heap capacity {}", capacity),
        };

        unsafe {
            let start = std::alloc::alloc(layout);
            if start.is_null() {
                std::alloc::handle_alloc_error(layout);
            }

            log::trace!("Reserved {} byte semispace at {:p}", capacity, start);

            Heap { start, current: start, end: start.add(capacity), layout }
        }
    }

    /// All allocations must be 8-byte aligned so round up to nearest multiple of 8. Returns `None`
    /// if the rounded size does not fit in a `usize`.
    #[inline]
    pub fn alloc_size_for_request_size(request_byte_size: usize) -> Option<usize> {
        let padded_size = request_byte_size.checked_add(HEAP_ITEM_ALIGNMENT - 1)?;
        Some(padded_size & !(HEAP_ITEM_ALIGNMENT - 1))
    }

    /// Rounded size of an item that is already on a heap. It was allocated, so rounding its size
    /// cannot overflow.
    #[inline]
    pub fn alloc_size_for_item_size(item_byte_size: usize) -> usize {
        match Self::alloc_size_for_request_size(item_byte_size) {
            Some(alloc_size) => alloc_size,
            None => panic!("Corrupt heap item with size {}", item_byte_size),
        }
    }

    /// Whether `size` bytes remain between the bump pointer and the end of the heap.
    #[inline]
    pub fn can_alloc(&self, size: usize) -> bool {
        size <= self.free_bytes()
    }

    /// Bump allocate `size` bytes, returning the start of the reserved span. The caller must have
    /// already checked that there is room with `can_alloc`.
    #[inline]
    pub fn alloc(&mut self, size: usize) -> HeapPtr<u8> {
        assert!(
            self.can_alloc(size),
            "Heap overflow: allocating {} bytes with {} bytes free",
            size,
            self.free_bytes()
        );

        let start = self.current;
        unsafe { self.current = self.current.add(size) };

        HeapPtr::from_ptr(start)
    }

    /// First item in allocation order, if the heap is not empty.
    pub fn first(&self) -> Option<HeapPtr<AnyHeapItem>> {
        if self.current == self.start {
            None
        } else {
            Some(HeapPtr::from_ptr(self.start.cast()))
        }
    }

    /// The item directly after `item` in allocation order, if `item` is not the last item.
    ///
    /// Reads the bump pointer on every call, so items allocated while walking the heap are
    /// visited as well.
    pub fn next(&self, item: HeapPtr<AnyHeapItem>) -> Option<HeapPtr<AnyHeapItem>> {
        debug_assert!(self.contains(item.as_ptr().cast::<u8>()));

        let alloc_size = Self::alloc_size_for_item_size(item.byte_size());
        let next = unsafe { item.as_ptr().cast::<u8>().add(alloc_size) };

        if next >= self.current {
            None
        } else {
            Some(HeapPtr::from_ptr(next.cast()))
        }
    }

    /// Iterate over all items in the heap in allocation order.
    pub fn iter(&self) -> HeapIter<'_> {
        HeapIter { heap: self, next: self.first() }
    }

    /// Discard all items in the heap. Memory is not cleared.
    pub fn reset(&mut self) {
        self.current = self.start;
    }

    /// Overwrite every allocated byte with a poison value, so reads through stale pointers into
    /// this heap are likely to crash.
    #[cfg(feature = "gc_stress_test")]
    pub fn poison(&mut self) {
        unsafe { std::ptr::write_bytes(self.start, 0x01, self.bytes_allocated()) };
    }

    /// Whether the pointer points into the region reserved for this heap.
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        (self.start as *const u8) <= ptr && ptr < (self.end as *const u8)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.end as usize - self.start as usize
    }

    #[inline]
    pub fn bytes_allocated(&self) -> usize {
        self.current as usize - self.start as usize
    }

    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.end as usize - self.current as usize
    }

    pub fn is_empty(&self) -> bool {
        self.current == self.start
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        unsafe { std::alloc::dealloc(self.start, self.layout) };
    }
}

pub struct HeapIter<'a> {
    heap: &'a Heap,
    next: Option<HeapPtr<AnyHeapItem>>,
}

impl Iterator for HeapIter<'_> {
    type Item = HeapPtr<AnyHeapItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.next?;
        self.next = self.heap.next(item);
        Some(item)
    }
}
