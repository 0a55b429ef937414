use std::fmt;

use crate::gc::{AnyHeapItem, HeapItemKind, HeapPtr};

/// A value held by the runtime, packed into a single word so it can live in heap item fields,
/// handle slots and root source slots alike.
///
/// Encoding, from the low bits up:
///   - `...0000` with all bits clear is nil
///   - `...000` with any higher bit set is a heap pointer (heap items are 8-byte aligned)
///   - `...x10` is a boolean, with the bit above the tag holding the boolean value
///   - `...1` is a small integer, stored in the upper 63 bits
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Value {
    bits: usize,
}

const NIL_BITS: usize = 0;

const POINTER_TAG_MASK: usize = 0b111;

const BOOL_TAG_MASK: usize = 0b11;
const BOOL_TAG: usize = 0b10;
const BOOL_VALUE_SHIFT: usize = 2;

const SMI_TAG: usize = 0b1;

impl Value {
    pub const MIN_SMI: isize = isize::MIN >> 1;
    pub const MAX_SMI: isize = isize::MAX >> 1;

    #[inline]
    pub const fn nil() -> Value {
        Value { bits: NIL_BITS }
    }

    #[inline]
    pub const fn bool(value: bool) -> Value {
        Value { bits: ((value as usize) << BOOL_VALUE_SHIFT) | BOOL_TAG }
    }

    /// Create a small integer. Panics if the integer does not fit in 63 bits.
    #[inline]
    pub fn smi(value: isize) -> Value {
        assert!(
            (Self::MIN_SMI..=Self::MAX_SMI).contains(&value),
            "Integer {} out of small integer range",
            value
        );
        Value { bits: ((value << 1) as usize) | SMI_TAG }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.bits == NIL_BITS
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        self.bits & BOOL_TAG_MASK == BOOL_TAG
    }

    #[inline]
    pub fn is_smi(&self) -> bool {
        self.bits & SMI_TAG == SMI_TAG
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.bits != NIL_BITS && self.bits & POINTER_TAG_MASK == 0
    }

    #[inline]
    pub fn as_bool(&self) -> bool {
        debug_assert!(self.is_bool());
        (self.bits >> BOOL_VALUE_SHIFT) & 1 == 1
    }

    #[inline]
    pub fn as_smi(&self) -> isize {
        debug_assert!(self.is_smi());
        (self.bits as isize) >> 1
    }

    #[inline]
    pub fn as_pointer(&self) -> HeapPtr<AnyHeapItem> {
        debug_assert!(self.is_pointer());
        HeapPtr::from_ptr(self.bits as *mut AnyHeapItem)
    }

    /// Kind of the referenced heap item, if this value is a pointer.
    #[inline]
    pub fn heap_kind(&self) -> Option<HeapItemKind> {
        if self.is_pointer() {
            Some(self.as_pointer().kind())
        } else {
            None
        }
    }

    #[inline]
    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl<T> From<HeapPtr<T>> for Value {
    #[inline]
    fn from(ptr: HeapPtr<T>) -> Self {
        Value { bits: ptr.addr() }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "nil")
        } else if self.is_bool() {
            write!(f, "{}", self.as_bool())
        } else if self.is_smi() {
            write!(f, "{}", self.as_smi())
        } else {
            write!(f, "<heap {:#x}>", self.bits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediates_are_not_pointers() {
        for value in [Value::nil(), Value::bool(true), Value::bool(false), Value::smi(-3)] {
            assert!(!value.is_pointer());
        }
    }

    #[test]
    fn bool_encoding() {
        assert!(Value::bool(true).is_bool());
        assert!(Value::bool(true).as_bool());
        assert!(!Value::bool(false).as_bool());
        assert!(!Value::bool(false).is_nil());
        assert!(!Value::bool(false).is_smi());
    }

    #[test]
    fn smi_encoding() {
        for n in [0, 1, -1, 42, Value::MIN_SMI, Value::MAX_SMI] {
            let value = Value::smi(n);
            assert!(value.is_smi());
            assert!(!value.is_bool());
            assert_eq!(value.as_smi(), n);
        }
    }

    #[test]
    fn pointer_encoding() {
        let mut slot = 0u64;
        let ptr = HeapPtr::from_ptr(&mut slot as *mut u64);
        let value = Value::from(ptr);

        assert!(value.is_pointer());
        assert_eq!(value.as_pointer().addr(), ptr.addr());
    }

    #[test]
    #[should_panic]
    fn smi_out_of_range() {
        Value::smi(isize::MAX);
    }
}
