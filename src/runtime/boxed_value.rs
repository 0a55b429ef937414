use std::mem::size_of;

use crate::{
    common::error::AllocResult,
    gc::{Handle, HeapItem, HeapItemKind, HeapPtr, HeapVisitor, ItemHeader, Memory, RootSource},
    set_uninit,
};

use super::Value;

/// A mutable cell holding a single value, e.g. a variable captured by a closure.
#[repr(C)]
pub struct BoxedValue {
    header: ItemHeader,
    value: Value,
}

impl BoxedValue {
    pub fn new<R: RootSource>(
        memory: &mut Memory<R>,
        value: Handle<Value>,
    ) -> AllocResult<Handle<BoxedValue>> {
        let mut boxed = memory.alloc_uninit::<BoxedValue>()?;

        set_uninit!(boxed.header, ItemHeader::new(HeapItemKind::Boxed));
        set_uninit!(boxed.value, value.get());

        Ok(boxed.to_handle(memory.handles_mut()))
    }

    #[inline]
    pub fn get(&self) -> Value {
        self.value
    }

    #[inline]
    pub fn set(&mut self, value: Value) {
        self.value = value;
    }
}

impl HeapItem for HeapPtr<BoxedValue> {
    fn byte_size(&self) -> usize {
        size_of::<BoxedValue>()
    }

    fn visit_pointers(&mut self, visitor: &mut impl HeapVisitor) {
        visitor.visit_value(&mut self.value);
    }
}
