//! # Tensor Operations Module (`ops`)
//!
//! Operations are grouped into submodules by functionality:
//!
//! - [`arithmetic`]: element-wise binary operations with broadcasting, plus
//!   their scalar variants.
//! - [`math_elem`]: element-wise unary functions (exp, sqrt, clamp).
//! - [`reduction`]: whole-tensor reductions to a scalar.
//! - [`view`]: reshaping, concatenation, gathering and dense batching.
//! - [`grouped`]: the segment-wise reduction primitive (`scatter_op` and
//!   `segment_op`) that every aggregation is built on.
//!
//! Each operation is an `xxx_op` free function performing the forward
//! computation. When an input requires gradients, the result records a
//! `Backward` struct implementing [`BackwardOp`](crate::autograd::BackwardOp)
//! that holds the forward context needed for backpropagation.

pub mod arithmetic;
pub mod grouped;
pub mod math_elem;
pub mod reduction;
pub mod view;
