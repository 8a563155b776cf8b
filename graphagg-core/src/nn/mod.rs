// src/nn/mod.rs
// Learnable state used by the aggregators.

pub mod init;
pub mod lazy;
pub mod parameter;

pub use lazy::LazyParameter;
pub use parameter::Parameter;
