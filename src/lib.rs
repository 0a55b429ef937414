pub mod common;
pub mod gc;
pub mod runtime;
