use super::HeapVisitor;

/// The host runtime's view of its own roots. A root source owns every reference into the heap that
/// is held outside of the heap itself, e.g. call stack slots, global bindings, or pending
/// exception state.
///
/// Called exactly once per collection, before any heap item is traced. Must visit every held
/// pointer so the collector can copy its referent and rewrite the pointer in place. Must not
/// allocate.
pub trait RootSource {
    fn visit_roots(&mut self, visitor: &mut impl HeapVisitor);
}

/// A host with no roots of its own. Only temporary handles keep items alive.
impl RootSource for () {
    fn visit_roots(&mut self, _: &mut impl HeapVisitor) {}
}
