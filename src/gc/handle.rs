use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use crate::runtime::Value;

use super::{HeapPtr, HeapVisitor, IsHeapItem};

/// A reference to a heap item held by native code that must survive allocations. The item itself
/// is stored in a slot of the `HandleContext`, which is treated as a root and rewritten when the
/// item moves. Every read through a handle goes through the slot, so it always sees the current
/// location of the item.
///
/// A handle is only valid until the scope that created it exits.
pub struct Handle<T> {
    slot: NonNull<Value>,
    phantom_data: PhantomData<T>,
}

impl<T> Handle<T> {
    #[inline]
    fn from_slot(slot: NonNull<Value>) -> Handle<T> {
        Handle { slot, phantom_data: PhantomData }
    }

    #[inline]
    pub fn cast<U>(&self) -> Handle<U> {
        Handle::from_slot(self.slot)
    }

    /// The value stored behind the handle, whatever its type.
    #[inline]
    pub fn get_value(&self) -> Value {
        unsafe { *self.slot.as_ptr() }
    }
}

impl Handle<Value> {
    /// Get the value stored behind the handle.
    #[inline]
    pub fn get(&self) -> Value {
        self.get_value()
    }

    /// Replace the value stored behind this handle with a new value. Note that all copies of this
    /// handle will also be changed.
    #[inline]
    pub fn replace(&mut self, value: Value) {
        unsafe { *self.slot.as_ptr() = value }
    }
}

impl<T: IsHeapItem> Handle<T> {
    /// Get the heap pointer stored behind the handle. Only valid until the next allocation.
    #[inline]
    pub fn get_(&self) -> HeapPtr<T> {
        **self
    }
}

impl Deref for Handle<Value> {
    type Target = Value;

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { self.slot.as_ref() }
    }
}

impl DerefMut for Handle<Value> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { self.slot.as_mut() }
    }
}

// A slot holding a heap item stores the item's address as the value's bits.
impl<T: IsHeapItem> Deref for Handle<T> {
    type Target = HeapPtr<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.slot.as_ptr() as *const HeapPtr<T>) }
    }
}

impl<T: IsHeapItem> DerefMut for Handle<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *(self.slot.as_ptr() as *mut HeapPtr<T>) }
    }
}

impl<T: IsHeapItem> From<Handle<T>> for Handle<Value> {
    #[inline]
    fn from(value: Handle<T>) -> Self {
        value.cast()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl Value {
    #[inline]
    pub fn to_handle(&self, handles: &mut HandleContext) -> Handle<Value> {
        handles.new_handle(*self)
    }
}

impl<T: IsHeapItem> HeapPtr<T> {
    #[inline]
    pub fn to_handle(&self, handles: &mut HandleContext) -> Handle<T> {
        handles.new_handle((*self).into())
    }
}

/// Registry of all temporary handles. Handles are allocated in a stack discipline: entering a
/// scope records the number of live handles, and exiting it discards every handle created since.
///
/// The slots are allocated once with a fixed capacity and never move, so handles can point
/// directly at them.
pub struct HandleContext {
    slots: Box<[Value]>,
    /// Number of slots currently in use
    num_handles: usize,
    /// Number of handles that were live when each open scope was entered, innermost scope last
    scopes: Vec<usize>,
}

impl HandleContext {
    pub fn new(max_handles: usize) -> HandleContext {
        HandleContext {
            slots: vec![Value::nil(); max_handles].into_boxed_slice(),
            num_handles: 0,
            scopes: vec![],
        }
    }

    /// Register a value as a temporary root in the innermost scope. Handles created while no scope
    /// is open live until the heap is shut down.
    pub fn new_handle<T>(&mut self, value: Value) -> Handle<T> {
        if self.num_handles == self.slots.len() {
            panic!("Exceeded maximum of {} live temporary handles", self.slots.len());
        }

        let slot = &mut self.slots[self.num_handles];
        *slot = value;
        self.num_handles += 1;

        Handle::from_slot(NonNull::from(slot))
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(self.num_handles);
    }

    /// Exit the innermost scope, discarding every handle created since it was entered.
    pub fn exit_scope(&mut self) {
        match self.scopes.pop() {
            Some(num_handles_before) => self.num_handles = num_handles_before,
            None => panic!("Exited a handle scope when no scope was open"),
        }
    }

    pub fn visit_roots(&mut self, visitor: &mut impl HeapVisitor) {
        for slot in &mut self.slots[..self.num_handles] {
            visitor.visit_value(slot);
        }
    }

    /// Number of live handles
    #[inline]
    pub fn len(&self) -> usize {
        self.num_handles
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of open scopes
    #[inline]
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }
}
