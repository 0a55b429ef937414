use std::mem::size_of;

use crate::common::{
    error::{AllocError, AllocResult},
    options::GcOptions,
};

use super::{
    garbage_collector::{CollectionSummary, GarbageCollector},
    AnyHeapItem, HandleContext, Heap, HeapItem, HeapPtr, HeapVisitor, ItemState, RootSource,
};

/// The managed heap. Owns two equally sized semispaces, the host's root source, and the registry of
/// temporary handles.
///
/// New items are bump allocated into the active semispace. When it fills up, every item reachable
/// from the root source or a live handle is copied into the reserve semispace, the active
/// semispace is discarded, and the two swap roles.
pub struct Memory<R: RootSource> {
    roots: R,
    /// Semispace that new items are allocated into
    active: Heap,
    /// Empty semispace that survivors are copied into during the next collection
    reserve: Heap,
    handles: HandleContext,
    options: GcOptions,
    stats: GcStats,
}

/// Running totals over all collections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats {
    pub num_collections: usize,
    pub total_objects_copied: usize,
    pub total_bytes_copied: usize,
    pub total_bytes_reclaimed: usize,
    /// Summary of the most recent collection
    pub last_collection: CollectionSummary,
}

impl GcStats {
    fn record(&mut self, summary: CollectionSummary) {
        self.num_collections += 1;
        self.total_objects_copied += summary.objects_copied;
        self.total_bytes_copied += summary.bytes_copied;
        self.total_bytes_reclaimed += summary.bytes_reclaimed;
        self.last_collection = summary;
    }
}

/// Snapshot of the state of the active semispace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapInfo {
    pub capacity: usize,
    pub bytes_allocated: usize,
    pub free_bytes: usize,
    pub num_collections: usize,
}

impl<R: RootSource> Memory<R> {
    pub fn new(roots: R, options: GcOptions) -> Memory<R> {
        let active = Heap::new(options.heap_size);
        let reserve = Heap::new(options.heap_size);
        let handles = HandleContext::new(options.max_handles);

        log::debug!(
            "Initialized managed heap with two {} byte semispaces and {} handle slots",
            active.capacity(),
            handles.capacity()
        );

        Memory { roots, active, reserve, handles, options, stats: GcStats::default() }
    }

    /// Release both semispaces, returning the root source to the host.
    pub fn shut_down(self) -> R {
        log::debug!(
            "Shutting down managed heap after {} collections ({} bytes copied, {} bytes reclaimed)",
            self.stats.num_collections,
            self.stats.total_bytes_copied,
            self.stats.total_bytes_reclaimed
        );

        let Memory { roots, .. } = self;
        roots
    }

    pub fn alloc_uninit<T>(&mut self) -> AllocResult<HeapPtr<T>> {
        self.alloc_uninit_with_size::<T>(size_of::<T>())
    }

    /// Allocate an item of a given type with the specified size in bytes. When called directly, is
    /// used to allocate dynamically sized items.
    ///
    /// Allocation will have at least the given size and is guaranteed to have 8-byte alignment.
    /// May run a collection, after which every `HeapPtr` not stored in a handle or reachable from
    /// the root source is invalid.
    pub fn alloc_uninit_with_size<T>(&mut self, size: usize) -> AllocResult<HeapPtr<T>> {
        // Sizes too large to round can never fit, so fail without collecting
        let alloc_size = match Heap::alloc_size_for_request_size(size) {
            Some(alloc_size) => alloc_size,
            None => return Err(self.out_of_memory(size)),
        };

        if self.options.stress_test || !self.active.can_alloc(alloc_size) {
            self.collect();

            // Make sure there is enough space for allocation after gc, otherwise we are out of heap
            // memory.
            if !self.active.can_alloc(alloc_size) {
                return Err(self.out_of_memory(alloc_size));
            }
        }

        Ok(self.active.alloc(alloc_size).cast())
    }

    fn out_of_memory(&self, requested: usize) -> AllocError {
        log::error!(
            "Out of heap memory: requested {} bytes with {} of {} bytes free",
            requested,
            self.active.free_bytes(),
            self.active.capacity()
        );

        AllocError::OutOfMemory { requested, available: self.active.free_bytes() }
    }

    /// Run a full collection.
    pub fn collect(&mut self) {
        let summary = {
            let mut gc = GarbageCollector::new(&self.active, &mut self.reserve);

            // All roots are copied before any item is traced
            self.roots.visit_roots(&mut gc);
            self.handles.visit_roots(&mut gc);

            gc.scan();
            gc.finish()
        };

        // In GC stress test mode, overwrite the old heap with 0x01 bytes to try to catch reads from
        // pointers to the old heap.
        #[cfg(feature = "gc_stress_test")]
        self.active.poison();

        self.active.reset();
        std::mem::swap(&mut self.active, &mut self.reserve);

        self.stats.record(summary);

        log::debug!(
            "Collection {}: copied {} items ({} bytes), reclaimed {} bytes",
            self.stats.num_collections,
            summary.objects_copied,
            summary.bytes_copied,
            summary.bytes_reclaimed
        );
    }

    /// Check that every pointer in the active semispace, the root source, and the handle registry
    /// points to a live item in the active semispace. Returns the number of items in the active
    /// semispace. Panics on the first dangling pointer.
    pub fn verify_heap(&mut self) -> usize {
        let mut verifier = HeapVerifier { heap: &self.active };

        self.roots.visit_roots(&mut verifier);
        self.handles.visit_roots(&mut verifier);

        let mut num_items = 0;
        for mut item in self.active.iter() {
            item.visit_pointers(&mut verifier);
            num_items += 1;
        }

        num_items
    }

    #[inline]
    pub fn roots(&self) -> &R {
        &self.roots
    }

    #[inline]
    pub fn roots_mut(&mut self) -> &mut R {
        &mut self.roots
    }

    #[inline]
    pub fn handles(&self) -> &HandleContext {
        &self.handles
    }

    #[inline]
    pub fn handles_mut(&mut self) -> &mut HandleContext {
        &mut self.handles
    }

    /// The semispace that new items are allocated into.
    #[inline]
    pub fn active_heap(&self) -> &Heap {
        &self.active
    }

    /// The semispace that will receive survivors during the next collection. Always empty outside
    /// of a collection.
    #[inline]
    pub fn reserve_heap(&self) -> &Heap {
        &self.reserve
    }

    #[inline]
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    #[inline]
    pub fn num_collections(&self) -> usize {
        self.stats.num_collections
    }

    pub fn heap_info(&self) -> HeapInfo {
        HeapInfo {
            capacity: self.active.capacity(),
            bytes_allocated: self.active.bytes_allocated(),
            free_bytes: self.active.free_bytes(),
            num_collections: self.stats.num_collections,
        }
    }
}

struct HeapVerifier<'a> {
    heap: &'a Heap,
}

impl HeapVisitor for HeapVerifier<'_> {
    fn visit(&mut self, ptr: &mut HeapPtr<AnyHeapItem>) {
        if !self.heap.contains(ptr.as_ptr().cast_const().cast()) {
            panic!("Dangling pointer {:?} outside of the active semispace", ptr);
        }

        if let ItemState::Forwarded(new_location) = ptr.state() {
            panic!("Pointer {:?} to an item relocated to {:?}", ptr, new_location);
        }
    }
}
