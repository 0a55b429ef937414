use std::mem::size_of;

use crate::set_uninit;

// An inline collection of a fixed number of elements that lives on the managed heap. Length is
// stored inline with the elements themselves.
#[repr(C)]
pub struct InlineArray<T> {
    // Number of elements in the array
    len: usize,
    // Variable sized array of elements. We must hardcode a constant number of elements, in this
    // case 1, to avoid this becoming a DST while keeping correct alignment and offset of fields.
    data: [T; 1],
}

impl<T> InlineArray<T> {
    /// Initialize the length of an uninitialized InlineArray. Elements must be initialized
    /// separately before the next allocation.
    pub fn init(&mut self, len: usize) {
        set_uninit!(self.len, len);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Size of an array with `len` elements. Saturates at `usize::MAX`, which no heap can satisfy.
    #[inline]
    pub fn calculate_size_in_bytes(len: usize) -> usize {
        len.saturating_mul(size_of::<T>()).saturating_add(size_of::<usize>())
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_mut_ptr(), self.len) }
    }
}

impl<T: Copy> InlineArray<T> {
    /// Initialize an uninitialized InlineArray with the contents of a slice.
    pub fn init_from_slice(&mut self, slice: &[T]) {
        self.init(slice.len());
        unsafe {
            std::ptr::copy_nonoverlapping(slice.as_ptr(), self.data.as_mut_ptr(), slice.len())
        };
    }

    /// Initialize an uninitialized InlineArray with `len` copies of `value`.
    pub fn init_with(&mut self, len: usize, value: T) {
        self.init(len);
        for i in 0..len {
            unsafe { self.data.as_mut_ptr().add(i).write(value) };
        }
    }
}
