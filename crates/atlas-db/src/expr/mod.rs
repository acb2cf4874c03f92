//! Expression types for building SQL conditions.

pub mod column;
pub mod ops;

pub use column::Col;
pub use ops::RecordEq;
