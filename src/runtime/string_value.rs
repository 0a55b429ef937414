use crate::{
    common::error::AllocResult,
    field_offset,
    gc::{Handle, HeapItem, HeapItemKind, HeapPtr, HeapVisitor, ItemHeader, Memory, RootSource},
    set_uninit,
};

use super::InlineArray;

/// An immutable UTF-8 string whose bytes are stored inline.
#[repr(C)]
pub struct StringValue {
    header: ItemHeader,
    data: InlineArray<u8>,
}

impl StringValue {
    const DATA_OFFSET: usize = field_offset!(StringValue, data);

    fn calculate_size_in_bytes(len: usize) -> usize {
        InlineArray::<u8>::calculate_size_in_bytes(len).saturating_add(Self::DATA_OFFSET)
    }

    pub fn new<R: RootSource>(
        memory: &mut Memory<R>,
        str: &str,
    ) -> AllocResult<Handle<StringValue>> {
        let size = Self::calculate_size_in_bytes(str.len());
        let mut string = memory.alloc_uninit_with_size::<StringValue>(size)?;

        set_uninit!(string.header, ItemHeader::new(HeapItemKind::String));
        string.data.init_from_slice(str.as_bytes());

        Ok(string.to_handle(memory.handles_mut()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ever initialized from a str
        unsafe { std::str::from_utf8_unchecked(self.data.as_slice()) }
    }
}

impl HeapItem for HeapPtr<StringValue> {
    fn byte_size(&self) -> usize {
        StringValue::calculate_size_in_bytes(self.len())
    }

    fn visit_pointers(&mut self, _: &mut impl HeapVisitor) {}
}
