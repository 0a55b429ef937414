mod garbage_collector;
mod handle;
mod handle_scope;
mod heap;
mod heap_item;
mod heap_visitor;
mod memory;
mod pointer;
mod root_source;

pub use garbage_collector::{CollectionSummary, GarbageCollector};
pub use handle::{Handle, HandleContext};
pub use handle_scope::{Escapable, HandleScope};
pub use heap::{Heap, HeapIter};
pub use heap_item::{
    AnyHeapItem, HeapItem, HeapItemKind, IsHeapItem, ItemHeader, ItemState, HEAP_ITEM_ALIGNMENT,
};
pub use heap_visitor::HeapVisitor;
pub use memory::{GcStats, HeapInfo, Memory};
pub use pointer::HeapPtr;
pub use root_source::RootSource;
