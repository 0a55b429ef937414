use std::mem::size_of;

use crate::runtime::{BoxedValue, NumberValue, RecordObject, StringValue};

use super::{HeapPtr, HeapVisitor};

/// All heap items are allocated with 8-byte alignment.
pub const HEAP_ITEM_ALIGNMENT: usize = 8;

/// Trait implemented by all items stored on the heap.
pub trait HeapItem {
    /// Size of this heap item in bytes. Not guaranteed to be aligned. Must never change over the
    /// lifetime of the item.
    fn byte_size(&self) -> usize;

    /// Call the provided visit function on all pointer fields in this item. Pass a mutable
    /// reference to the fields themselves so they can be updated in copying collection.
    fn visit_pointers(&mut self, visitor: &mut impl HeapVisitor);
}

/// Marker trait that denotes an item on the managed heap
pub trait IsHeapItem {}

impl<T> IsHeapItem for T where HeapPtr<T>: HeapItem {}

/// The closed set of item kinds that can be stored on the heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HeapItemKind {
    Number,
    String,
    Record,
    Boxed,
}

impl HeapItemKind {
    const ALL: [HeapItemKind; 4] = [
        HeapItemKind::Number,
        HeapItemKind::String,
        HeapItemKind::Record,
        HeapItemKind::Boxed,
    ];

    fn from_tag(tag: usize) -> HeapItemKind {
        match Self::ALL.get(tag) {
            Some(kind) => *kind,
            None => panic!("Corrupt heap item header with kind tag {}", tag),
        }
    }
}

// The first word of every heap item is its header, which is either:
//   - The kind of the item, shifted left by one, if the item is live
//   - A forwarding pointer to the address in to-space the item has been copied to
//
// Heap items are 8-byte aligned so the lowest bit of a real address is always clear. Tag the
// lowest bit to signal a forwarding pointer.
const FORWARDING_POINTER_TAG: usize = 0x1;

#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ItemHeader {
    bits: usize,
}

// A forwarding pointer overwrites only the header, so it fits in even the smallest item.
const _: () = assert!(size_of::<ItemHeader>() <= HEAP_ITEM_ALIGNMENT);

impl ItemHeader {
    #[inline]
    pub const fn new(kind: HeapItemKind) -> ItemHeader {
        ItemHeader { bits: (kind as usize) << 1 }
    }

    #[inline]
    fn forwarding(new_location: HeapPtr<AnyHeapItem>) -> ItemHeader {
        debug_assert!(new_location.addr() % HEAP_ITEM_ALIGNMENT == 0);
        ItemHeader { bits: new_location.addr() | FORWARDING_POINTER_TAG }
    }

    #[inline]
    pub fn state(self) -> ItemState {
        if self.bits & FORWARDING_POINTER_TAG == FORWARDING_POINTER_TAG {
            let ptr = (self.bits ^ FORWARDING_POINTER_TAG) as *mut AnyHeapItem;
            ItemState::Forwarded(HeapPtr::from_ptr(ptr))
        } else {
            ItemState::Live(HeapItemKind::from_tag(self.bits >> 1))
        }
    }
}

/// A typed view of a heap item's header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemState {
    /// A real item of the given kind.
    Live(HeapItemKind),
    /// The item was copied during the current collection. Its old location now only holds the
    /// address of the copy.
    Forwarded(HeapPtr<AnyHeapItem>),
}

/// An arbitrary heap item. Only common field between heap items is their header, which can be
/// used to determine the true type of the heap item.
#[repr(C)]
pub struct AnyHeapItem {
    header: ItemHeader,
}

impl AnyHeapItem {
    #[inline]
    pub fn state(&self) -> ItemState {
        self.header.state()
    }

    /// The kind of a live item. Panics if the item has been forwarded.
    #[inline]
    pub fn kind(&self) -> HeapItemKind {
        match self.state() {
            ItemState::Live(kind) => kind,
            ItemState::Forwarded(_) => panic!("Accessed relocated heap item {:p}", self),
        }
    }

    #[inline]
    pub fn forwarding_address(&self) -> Option<HeapPtr<AnyHeapItem>> {
        match self.state() {
            ItemState::Live(_) => None,
            ItemState::Forwarded(new_location) => Some(new_location),
        }
    }

    /// Overwrite this item's header with a forwarding pointer to its new location. The item must
    /// never be read as a live item again.
    #[inline]
    pub fn forward_to(&mut self, new_location: HeapPtr<AnyHeapItem>) {
        self.header = ItemHeader::forwarding(new_location);
    }
}

impl HeapPtr<AnyHeapItem> {
    pub fn byte_size_for_kind(&self, kind: HeapItemKind) -> usize {
        match kind {
            HeapItemKind::Number => self.cast::<NumberValue>().byte_size(),
            HeapItemKind::String => self.cast::<StringValue>().byte_size(),
            HeapItemKind::Record => self.cast::<RecordObject>().byte_size(),
            HeapItemKind::Boxed => self.cast::<BoxedValue>().byte_size(),
        }
    }

    pub fn visit_pointers_for_kind(&mut self, visitor: &mut impl HeapVisitor, kind: HeapItemKind) {
        match kind {
            HeapItemKind::Number => self.cast::<NumberValue>().visit_pointers(visitor),
            HeapItemKind::String => self.cast::<StringValue>().visit_pointers(visitor),
            HeapItemKind::Record => self.cast::<RecordObject>().visit_pointers(visitor),
            HeapItemKind::Boxed => self.cast::<BoxedValue>().visit_pointers(visitor),
        }
    }
}

impl HeapItem for HeapPtr<AnyHeapItem> {
    fn byte_size(&self) -> usize {
        self.byte_size_for_kind(self.kind())
    }

    fn visit_pointers(&mut self, visitor: &mut impl HeapVisitor) {
        let kind = self.kind();
        self.visit_pointers_for_kind(visitor, kind);
    }
}
