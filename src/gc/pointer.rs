use std::{
    fmt,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

/// A raw pointer to an item in the managed heap.
///
/// Only valid until the next allocation, since any allocation may run a collection which moves
/// the item. Pointers that must survive an allocation are stored in a `Handle` instead.
#[repr(transparent)]
pub struct HeapPtr<T> {
    ptr: NonNull<T>,
}

impl<T> HeapPtr<T> {
    #[inline]
    pub const fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub const fn from_ptr(ptr: *mut T) -> HeapPtr<T> {
        unsafe { HeapPtr { ptr: NonNull::new_unchecked(ptr) } }
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }

    #[inline]
    pub fn cast<U>(&self) -> HeapPtr<U> {
        HeapPtr::from_ptr(self.as_ptr() as *mut U)
    }

    #[inline]
    pub fn addr(&self) -> usize {
        self.as_ptr() as usize
    }
}

impl<T> Clone for HeapPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HeapPtr<T> {}

impl<T> PartialEq for HeapPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for HeapPtr<T> {}

impl<T> fmt::Debug for HeapPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapPtr({:p})", self.ptr)
    }
}

impl<T> Deref for HeapPtr<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for HeapPtr<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { self.ptr.as_mut() }
    }
}
