use std::sync::Arc;

use num_traits::Float;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::ops::grouped::ReduceKind;
use crate::tensor::utils::split_at_axis;
use crate::tensor::Tensor;

/// Assignment of the positions along one axis to output groups.
#[derive(Debug, Clone)]
pub(crate) struct GroupLayout {
    pub(crate) shape: Vec<usize>,
    pub(crate) dim: usize,
    /// Group of every position along `dim`; `None` positions are ignored.
    pub(crate) group_of: Vec<Option<usize>>,
    pub(crate) dim_size: usize,
}

impl GroupLayout {
    /// Checks the assignment against the input shape and the group count.
    ///
    /// A group id `>= dim_size` fails with `IndexOutOfBounds`, the raw fault
    /// the aggregation contract later reinterprets.
    pub(crate) fn new(
        shape: Vec<usize>,
        dim: usize,
        group_of: Vec<Option<usize>>,
        dim_size: usize,
    ) -> Result<Self, GraphAggError> {
        let rank = shape.len();
        if dim >= rank {
            return Err(GraphAggError::InvalidDimension {
                dim: dim as isize,
                rank,
            });
        }
        if group_of.len() != shape[dim] {
            return Err(GraphAggError::ShapeMismatch {
                expected: vec![shape[dim]],
                actual: vec![group_of.len()],
                operation: "grouped reduction index".to_string(),
            });
        }
        if let Some(g) = group_of.iter().flatten().find(|&&g| g >= dim_size) {
            return Err(GraphAggError::IndexOutOfBounds {
                index: vec![*g],
                shape: vec![dim_size],
            });
        }
        Ok(GroupLayout {
            shape,
            dim,
            group_of,
            dim_size,
        })
    }

    pub(crate) fn output_shape(&self) -> Vec<usize> {
        let mut shape = self.shape.clone();
        shape[self.dim] = self.dim_size;
        shape
    }

    /// Calls `f(input_offset, output_offset, group)` for every grouped element.
    fn for_each(&self, mut f: impl FnMut(usize, usize, usize)) {
        let (outer, size, inner) = split_at_axis(&self.shape, self.dim);
        for o in 0..outer {
            for (p, group) in self.group_of.iter().enumerate() {
                let Some(g) = *group else { continue };
                let input_base = (o * size + p) * inner;
                let output_base = (o * self.dim_size + g) * inner;
                for i in 0..inner {
                    f(input_base + i, output_base + i, g);
                }
            }
        }
    }
}

/// Result of a grouped reduction plus the context its gradient needs.
#[derive(Debug, Clone)]
pub(crate) struct GroupedOutput<T> {
    pub(crate) values: Vec<T>,
    /// Number of positions per group.
    pub(crate) counts: Vec<usize>,
    /// Winning input offset per output element (max / min only).
    pub(crate) arg: Vec<Option<usize>>,
    /// Group mean per output element (var / std only).
    pub(crate) means: Vec<T>,
}

fn cast<T: Float>(value: f64) -> Result<T, GraphAggError> {
    T::from(value).ok_or_else(|| {
        GraphAggError::InternalError(format!("value {} not representable", value))
    })
}

/// Reduces `x` (row-major, shaped as `layout.shape`) group by group.
pub(crate) fn grouped_reduce_kernel<T: Float>(
    x: &[T],
    layout: &GroupLayout,
    kind: ReduceKind,
) -> Result<GroupedOutput<T>, GraphAggError> {
    let output_numel: usize = layout.output_shape().iter().product();
    let mut counts = vec![0usize; layout.dim_size];
    for g in layout.group_of.iter().flatten() {
        counts[*g] += 1;
    }
    let (_, _, inner) = split_at_axis(&layout.shape, layout.dim);
    // Output offsets are laid out as [outer, dim_size, inner].
    let count_of = |out: usize| -> usize { counts[(out / inner) % layout.dim_size] };

    let empty: T = cast(kind.empty_value() as f64)?;
    let mut values = vec![T::zero(); output_numel];
    let mut arg: Vec<Option<usize>> = Vec::new();
    let mut means: Vec<T> = Vec::new();

    match kind {
        ReduceKind::Sum | ReduceKind::Mean | ReduceKind::Var | ReduceKind::Std => {
            layout.for_each(|src, dst, _| values[dst] = values[dst] + x[src]);
            if kind != ReduceKind::Sum {
                for (out, v) in values.iter_mut().enumerate() {
                    let c = count_of(out);
                    *v = if c == 0 { T::zero() } else { *v / cast(c as f64)? };
                }
            }
            if matches!(kind, ReduceKind::Var | ReduceKind::Std) {
                means = values.clone();
                let mut squares = vec![T::zero(); output_numel];
                layout.for_each(|src, dst, _| {
                    let r = x[src] - means[dst];
                    squares[dst] = squares[dst] + r * r;
                });
                for (out, v) in values.iter_mut().enumerate() {
                    let c = count_of(out);
                    let var = if c == 0 { T::zero() } else { squares[out] / cast(c as f64)? };
                    *v = if kind == ReduceKind::Std {
                        var.max(T::zero()).sqrt()
                    } else {
                        var
                    };
                }
            }
        }
        ReduceKind::Max | ReduceKind::Min => {
            arg = vec![None; output_numel];
            layout.for_each(|src, dst, _| {
                let better = match arg[dst] {
                    None => true,
                    Some(best) if kind == ReduceKind::Max => x[src] > x[best],
                    Some(best) => x[src] < x[best],
                };
                if better {
                    arg[dst] = Some(src);
                }
            });
            for (v, a) in values.iter_mut().zip(&arg) {
                *v = a.map_or(empty, |src| x[src]);
            }
        }
        ReduceKind::Mul => {
            values = vec![T::one(); output_numel];
            layout.for_each(|src, dst, _| values[dst] = values[dst] * x[src]);
        }
    }

    Ok(GroupedOutput {
        values,
        counts,
        arg,
        means,
    })
}

/// Runs the kernel on `x` and records the backward context when needed.
pub(crate) fn grouped_reduce_op(
    x: &Tensor,
    layout: GroupLayout,
    kind: ReduceKind,
) -> Result<Tensor, GraphAggError> {
    let buffer = x.buffer();
    let mut reduced = grouped_reduce_kernel(buffer.as_slice(), &layout, kind)?;
    let result = Tensor::new(std::mem::take(&mut reduced.values), layout.output_shape())?;
    if x.requires_grad() {
        result.attach_grad_fn(Arc::new(GroupedReduceBackward {
            input: x.clone(),
            layout,
            kind,
            output: result.buffer(),
            context: reduced,
        }));
    }
    Ok(result)
}

// --- Backward Operation ---

#[derive(Debug)]
struct GroupedReduceBackward {
    input: Tensor,
    layout: GroupLayout,
    kind: ReduceKind,
    output: Arc<Vec<f32>>,
    context: GroupedOutput<f32>,
}

impl BackwardOp for GroupedReduceBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let upstream = grad_output.buffer();
        let x = self.input.buffer();
        let counts = &self.context.counts;
        let mut grad = vec![0.0f32; x.len()];

        match self.kind {
            ReduceKind::Sum => self.layout.for_each(|src, dst, _| grad[src] = upstream[dst]),
            ReduceKind::Mean => self
                .layout
                .for_each(|src, dst, g| grad[src] = upstream[dst] / counts[g] as f32),
            ReduceKind::Max | ReduceKind::Min => {
                for (dst, winner) in self.context.arg.iter().enumerate() {
                    if let Some(src) = *winner {
                        grad[src] += upstream[dst];
                    }
                }
            }
            ReduceKind::Mul => {
                // Product of the other group members, safe for zeros.
                let out_len = self.output.len();
                let mut zeros = vec![0usize; out_len];
                let mut nonzero_product = vec![1.0f32; out_len];
                self.layout.for_each(|src, dst, _| {
                    if x[src] == 0.0 {
                        zeros[dst] += 1;
                    } else {
                        nonzero_product[dst] *= x[src];
                    }
                });
                self.layout.for_each(|src, dst, _| {
                    let others = match (zeros[dst], x[src] == 0.0) {
                        (0, _) => nonzero_product[dst] / x[src],
                        (1, true) => nonzero_product[dst],
                        _ => 0.0,
                    };
                    grad[src] = upstream[dst] * others;
                });
            }
            ReduceKind::Var => {
                let means = &self.context.means;
                self.layout.for_each(|src, dst, g| {
                    grad[src] = upstream[dst] * 2.0 * (x[src] - means[dst]) / counts[g] as f32;
                });
            }
            ReduceKind::Std => {
                let means = &self.context.means;
                self.layout.for_each(|src, dst, g| {
                    let std = self.output[dst];
                    grad[src] = if std > 0.0 {
                        upstream[dst] * (x[src] - means[dst]) / (counts[g] as f32 * std)
                    } else {
                        0.0
                    };
                });
            }
        }

        Ok(vec![Tensor::new(grad, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

#[cfg(test)]
#[path = "kernel_test.rs"]
mod tests;
