use crate::{common::error::AllocError, runtime::Value};

use super::{Handle, HandleContext, Memory, RootSource};

/// Delimits the lifetime of temporary handles. Every handle created while the scope is open is
/// discarded when it exits, except for the result of the scope which is escaped into the parent
/// scope.
///
/// Wrap any sequence of allocations whose intermediate results are not yet linked into a rooted
/// structure, so the handle registry does not grow without bound.
pub struct HandleScope;

impl HandleScope {
    pub fn new<R: RootSource, T: Escapable>(
        memory: &mut Memory<R>,
        f: impl FnOnce(&mut Memory<R>) -> T,
    ) -> T {
        memory.handles_mut().enter_scope();
        let result = f(memory);
        memory.handles_mut().exit_scope();

        result.escape(memory.handles_mut())
    }
}

/// A value that can be moved out of an exiting handle scope into its parent scope.
///
/// `escape` is called after the inner scope has exited. It must read each contained handle before
/// creating any new handle, so at most one handle can be escaped per value.
pub trait Escapable {
    fn escape(&self, handles: &mut HandleContext) -> Self;
}

impl<T> Escapable for Handle<T> {
    #[inline]
    fn escape(&self, handles: &mut HandleContext) -> Self {
        handles.new_handle(self.get_value())
    }
}

impl<T: Escapable> Escapable for Option<T> {
    #[inline]
    fn escape(&self, handles: &mut HandleContext) -> Self {
        self.as_ref().map(|inner| inner.escape(handles))
    }
}

impl<T: Escapable, E: Escapable> Escapable for Result<T, E> {
    #[inline]
    fn escape(&self, handles: &mut HandleContext) -> Self {
        match self {
            Ok(ok) => Ok(ok.escape(handles)),
            Err(err) => Err(err.escape(handles)),
        }
    }
}

macro_rules! escapable_by_copy {
    ($($ty:ty),*) => {
        $(
            impl Escapable for $ty {
                #[inline]
                fn escape(&self, _: &mut HandleContext) -> Self {
                    *self
                }
            }
        )*
    };
}

escapable_by_copy!((), bool, usize, f64, AllocError);

// Only immediates can be returned from a scope as a bare value.
impl Escapable for Value {
    #[inline]
    fn escape(&self, _: &mut HandleContext) -> Self {
        assert!(!self.is_pointer(), "Heap pointers must escape a scope in a handle");
        *self
    }
}
