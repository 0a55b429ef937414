use crate::{
    common::error::AllocResult,
    field_offset,
    gc::{Handle, HeapItem, HeapItemKind, HeapPtr, HeapVisitor, ItemHeader, Memory, RootSource},
    set_uninit,
};

use super::{InlineArray, StringValue, Value};

/// A named record with a fixed number of mutable fields. Fields may reference any value,
/// including the record itself.
#[repr(C)]
pub struct RecordObject {
    header: ItemHeader,
    /// Name of the record's class
    name: HeapPtr<StringValue>,
    /// Inline array of field values
    fields: InlineArray<Value>,
}

impl RecordObject {
    const FIELDS_OFFSET: usize = field_offset!(RecordObject, fields);

    fn calculate_size_in_bytes(num_fields: usize) -> usize {
        let fields_size = InlineArray::<Value>::calculate_size_in_bytes(num_fields);
        fields_size.saturating_add(Self::FIELDS_OFFSET)
    }

    /// Create a record with the given field values.
    pub fn new<R: RootSource>(
        memory: &mut Memory<R>,
        name: Handle<StringValue>,
        fields: &[Handle<Value>],
    ) -> AllocResult<Handle<RecordObject>> {
        let size = Self::calculate_size_in_bytes(fields.len());
        let mut record = memory.alloc_uninit_with_size::<RecordObject>(size)?;

        // Handles are read after allocation so they observe any relocation
        set_uninit!(record.header, ItemHeader::new(HeapItemKind::Record));
        set_uninit!(record.name, name.get_());

        record.fields.init(fields.len());
        for (slot, field) in record.fields.as_mut_slice().iter_mut().zip(fields) {
            set_uninit!(*slot, field.get());
        }

        Ok(record.to_handle(memory.handles_mut()))
    }

    /// Create a record with every field set to nil.
    pub fn new_with_nil_fields<R: RootSource>(
        memory: &mut Memory<R>,
        name: Handle<StringValue>,
        num_fields: usize,
    ) -> AllocResult<Handle<RecordObject>> {
        let size = Self::calculate_size_in_bytes(num_fields);
        let mut record = memory.alloc_uninit_with_size::<RecordObject>(size)?;

        set_uninit!(record.header, ItemHeader::new(HeapItemKind::Record));
        set_uninit!(record.name, name.get_());
        record.fields.init_with(num_fields, Value::nil());

        Ok(record.to_handle(memory.handles_mut()))
    }

    #[inline]
    pub fn name(&self) -> HeapPtr<StringValue> {
        self.name
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn get_field(&self, index: usize) -> Value {
        self.fields.as_slice()[index]
    }

    #[inline]
    pub fn set_field(&mut self, index: usize, value: Value) {
        self.fields.as_mut_slice()[index] = value;
    }
}

impl HeapItem for HeapPtr<RecordObject> {
    fn byte_size(&self) -> usize {
        RecordObject::calculate_size_in_bytes(self.num_fields())
    }

    fn visit_pointers(&mut self, visitor: &mut impl HeapVisitor) {
        visitor.visit_pointer(&mut self.name);

        for field in self.fields.as_mut_slice() {
            visitor.visit_value(field);
        }
    }
}
