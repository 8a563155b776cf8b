use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::Tensor;

pub mod clamp;
pub mod exp;
pub mod sqrt;

pub use clamp::clamp_op;
pub use exp::exp_op;
pub use sqrt::sqrt_op;

/// Element-wise unary function kinds sharing one kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum UnaryKind {
    Exp,
    Sqrt,
    PowScalar(f32),
    Clamp { min: f32, max: f32 },
    MulScalar(f32),
    AddScalar(f32),
}

impl UnaryKind {
    fn apply(self, x: f32) -> f32 {
        match self {
            UnaryKind::Exp => x.exp(),
            UnaryKind::Sqrt => x.sqrt(),
            UnaryKind::PowScalar(p) => x.powf(p),
            UnaryKind::Clamp { min, max } => x.max(min).min(max),
            UnaryKind::MulScalar(c) => x * c,
            UnaryKind::AddScalar(c) => x + c,
        }
    }

    /// `d out / d x`, given the input and the forward result.
    fn derivative(self, x: f32, out: f32) -> f32 {
        match self {
            UnaryKind::Exp => out,
            // Sub-gradient 0 at the origin.
            UnaryKind::Sqrt => {
                if out > 0.0 {
                    0.5 / out
                } else {
                    0.0
                }
            }
            UnaryKind::PowScalar(p) => {
                if p == 0.0 {
                    0.0
                } else {
                    p * x.powf(p - 1.0)
                }
            }
            UnaryKind::Clamp { min, max } => {
                if x >= min && x <= max {
                    1.0
                } else {
                    0.0
                }
            }
            UnaryKind::MulScalar(c) => c,
            UnaryKind::AddScalar(_) => 1.0,
        }
    }
}

/// Applies `kind` to every element of `input`.
pub(crate) fn apply_unary_op(input: &Tensor, kind: UnaryKind) -> Result<Tensor, GraphAggError> {
    let input_buffer = input.buffer();
    let result_data: Vec<f32> = input_buffer.iter().map(|&x| kind.apply(x)).collect();
    let result = Tensor::new(result_data, input.shape())?;

    if input.requires_grad() {
        let grad_fn = UnaryBackward {
            kind,
            input: input.clone(),
            output: result.buffer(),
        };
        result.attach_grad_fn(Arc::new(grad_fn));
    }
    Ok(result)
}

// --- Backward Operation ---

#[derive(Debug)]
struct UnaryBackward {
    kind: UnaryKind,
    input: Tensor,
    output: Arc<Vec<f32>>,
}

impl BackwardOp for UnaryBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let upstream = grad_output.buffer();
        let input_buffer = self.input.buffer();
        let grad: Vec<f32> = upstream
            .iter()
            .zip(input_buffer.iter())
            .zip(self.output.iter())
            .map(|((&g, &x), &out)| g * self.kind.derivative(x, out))
            .collect();
        Ok(vec![Tensor::new(grad, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}
