use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::broadcast_utils::{broadcast_offsets, reduce_to_shape};
use crate::tensor::utils::broadcast_shapes;
use crate::tensor::Tensor;

pub mod add;
pub mod div;
pub mod max_elemwise;
pub mod mul;
pub mod pow;
pub mod sub;

pub use add::{add_op, add_scalar_op};
pub use div::div_op;
pub use max_elemwise::{maximum_op, minimum_op};
pub use mul::{mul_op, mul_scalar_op};
pub use pow::{pow_op, pow_scalar_op};
pub use sub::sub_op;

/// Element-wise binary operation kinds sharing one broadcasting kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BinaryKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Maximum,
    Minimum,
}

impl BinaryKind {
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryKind::Add => a + b,
            BinaryKind::Sub => a - b,
            BinaryKind::Mul => a * b,
            BinaryKind::Div => a / b,
            BinaryKind::Pow => a.powf(b),
            BinaryKind::Maximum => {
                if a >= b {
                    a
                } else {
                    b
                }
            }
            BinaryKind::Minimum => {
                if a <= b {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// Local derivatives `(d out / d a, d out / d b)`.
    fn partials(self, a: f32, b: f32, out: f32) -> (f32, f32) {
        match self {
            BinaryKind::Add => (1.0, 1.0),
            BinaryKind::Sub => (1.0, -1.0),
            BinaryKind::Mul => (b, a),
            BinaryKind::Div => (1.0 / b, -a / (b * b)),
            BinaryKind::Pow => {
                let da = if b == 0.0 { 0.0 } else { b * a.powf(b - 1.0) };
                // d/db a^b = a^b ln(a), undefined for a <= 0
                let db = if a > 0.0 { out * a.ln() } else { 0.0 };
                (da, db)
            }
            // Ties route the gradient to `a`.
            BinaryKind::Maximum => {
                if a >= b {
                    (1.0, 0.0)
                } else {
                    (0.0, 1.0)
                }
            }
            BinaryKind::Minimum => {
                if a <= b {
                    (1.0, 0.0)
                } else {
                    (0.0, 1.0)
                }
            }
        }
    }
}

/// Applies `kind` element-wise to `a` and `b` with NumPy-style broadcasting.
pub(crate) fn apply_binary_op(
    a: &Tensor,
    b: &Tensor,
    kind: BinaryKind,
) -> Result<Tensor, GraphAggError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    let output_shape = broadcast_shapes(&a_shape, &b_shape)?;
    let a_offsets = broadcast_offsets(&output_shape, &a_shape);
    let b_offsets = broadcast_offsets(&output_shape, &b_shape);

    let a_buffer = a.buffer();
    let b_buffer = b.buffer();
    let result_data: Vec<f32> = a_offsets
        .iter()
        .zip(&b_offsets)
        .map(|(&i, &j)| kind.apply(a_buffer[i], b_buffer[j]))
        .collect();
    let result = Tensor::new(result_data, output_shape)?;

    if a.requires_grad() || b.requires_grad() {
        let grad_fn = BinaryBackward {
            kind,
            a: a.clone(),
            b: b.clone(),
            a_offsets,
            b_offsets,
            output: result.buffer(),
        };
        result.attach_grad_fn(Arc::new(grad_fn));
    }
    Ok(result)
}

// --- Backward Operation ---

#[derive(Debug)]
struct BinaryBackward {
    kind: BinaryKind,
    a: Tensor,
    b: Tensor,
    a_offsets: Vec<usize>,
    b_offsets: Vec<usize>,
    output: Arc<Vec<f32>>,
}

impl BackwardOp for BinaryBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let upstream = grad_output.buffer();
        let a_buffer = self.a.buffer();
        let b_buffer = self.b.buffer();

        let mut grad_a_full = Vec::with_capacity(upstream.len());
        let mut grad_b_full = Vec::with_capacity(upstream.len());
        for (k, &g) in upstream.iter().enumerate() {
            let (i, j) = (self.a_offsets[k], self.b_offsets[k]);
            let (da, db) = self.kind.partials(a_buffer[i], b_buffer[j], self.output[k]);
            grad_a_full.push(g * da);
            grad_b_full.push(g * db);
        }

        let grad_a = reduce_to_shape(&grad_a_full, &self.a_offsets, a_buffer.len());
        let grad_b = reduce_to_shape(&grad_b_full, &self.b_offsets, b_buffer.len());
        Ok(vec![
            Tensor::new(grad_a, self.a.shape())?,
            Tensor::new(grad_b, self.b.shape())?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}
