use crate::runtime::Value;

use super::{AnyHeapItem, HeapPtr};

pub trait HeapVisitor {
    /// Visit a strongly held pointer. The visitor may rewrite the pointer in place.
    fn visit(&mut self, ptr: &mut HeapPtr<AnyHeapItem>);

    /// Visit a strongly held pointer of any type.
    #[inline]
    fn visit_pointer<T>(&mut self, ptr: &mut HeapPtr<T>) {
        let ptr = unsafe { &mut *(ptr as *mut HeapPtr<T> as *mut HeapPtr<AnyHeapItem>) };
        self.visit(ptr);
    }

    /// Visit a strongly held value. Only values that hold heap pointers are visited.
    #[inline]
    fn visit_value(&mut self, value: &mut Value) {
        if value.is_pointer() {
            let ptr = unsafe { &mut *(value as *mut Value as *mut HeapPtr<AnyHeapItem>) };
            self.visit(ptr);
        }
    }
}
