use std::mem::size_of;

use crate::{
    common::error::AllocResult,
    gc::{Handle, HeapItem, HeapItemKind, HeapPtr, HeapVisitor, ItemHeader, Memory, RootSource},
    set_uninit,
};

/// A boxed floating point number.
#[repr(C)]
pub struct NumberValue {
    header: ItemHeader,
    value: f64,
}

impl NumberValue {
    pub fn new<R: RootSource>(
        memory: &mut Memory<R>,
        value: f64,
    ) -> AllocResult<Handle<NumberValue>> {
        let mut number = memory.alloc_uninit::<NumberValue>()?;

        set_uninit!(number.header, ItemHeader::new(HeapItemKind::Number));
        set_uninit!(number.value, value);

        Ok(number.to_handle(memory.handles_mut()))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl HeapItem for HeapPtr<NumberValue> {
    fn byte_size(&self) -> usize {
        size_of::<NumberValue>()
    }

    fn visit_pointers(&mut self, _: &mut impl HeapVisitor) {}
}
