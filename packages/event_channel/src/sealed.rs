/// Prevents implementations of public traits outside this crate.
pub trait Sealed {}
