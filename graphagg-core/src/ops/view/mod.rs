pub mod cat;
pub mod dense_batch;
pub mod index_select;
pub mod reshape;

pub use cat::cat_op;
pub use dense_batch::to_dense_batch_op;
pub use index_select::index_select_op;
pub use reshape::reshape_op;
