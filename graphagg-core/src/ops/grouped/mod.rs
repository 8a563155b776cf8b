//! Segment-wise reduction primitive.
//!
//! Elements along one axis of a tensor are assigned to groups, either through
//! a per-element group `index` (scatter path, any order) or through a
//! monotonically increasing offset vector `ptr` (segment path, contiguous
//! groups). Each group is reduced independently with one of the
//! [`ReduceKind`]s, and empty groups take [`ReduceKind::empty_value`].

pub mod kernel;
pub mod kind;
pub mod scatter;
pub mod segment;

pub use kind::ReduceKind;
pub use scatter::scatter_op;
pub use segment::{check_ptr_covers, ptr_to_index, segment_op};
