use approx::relative_eq;
use thiserror::Error;

use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(GraphAggError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(GraphAggError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(GraphAggError),
    #[error("Input tensor {input_index} requires grad but has no gradient after backward pass.")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },
    #[error("Gradient check input tensor must be a leaf node (no grad_fn). Input index: {input_index}")]
    InputNotLeaf { input_index: usize },
    #[error("Function did not propagate requires_grad correctly.")]
    RequiresGradPropagationError,
}

impl From<GraphAggError> for GradCheckError {
    fn from(err: GraphAggError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks analytical gradients against numerical gradients using central
/// finite differences.
///
/// The scalar loss is `sum(func(inputs) * output_grad)`, so the analytical
/// gradient is obtained by seeding `backward` with `output_grad`.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, GraphAggError>,
{
    for (i, input) in inputs.iter().enumerate() {
        if input.requires_grad() && !input.is_leaf() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
        if input.requires_grad() {
            input.clear_grad();
        }
    }

    // --- 1. Analytical gradients ---
    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;
    let any_input_requires_grad = inputs.iter().any(|t| t.requires_grad());
    if any_input_requires_grad && !output.requires_grad() {
        return Err(GradCheckError::RequiresGradPropagationError);
    }
    if output.requires_grad() {
        output
            .backward(Some(output_grad.clone()))
            .map_err(GradCheckError::BackwardPassError)?;
    }
    let seed = output_grad.get_f32_data();

    // --- 2. Numerical gradients, element by element ---
    for (i, original_input) in inputs.iter().enumerate() {
        if !original_input.requires_grad() {
            continue;
        }
        let analytical: Vec<f64> = match original_input.grad() {
            Some(grad) => grad.get_f32_data().iter().map(|&v| v as f64).collect(),
            None => return Err(GradCheckError::MissingAnalyticalGrad { input_index: i }),
        };
        let original_data: Vec<f64> = original_input
            .get_f32_data()
            .iter()
            .map(|&v| v as f64)
            .collect();

        for elem_idx in 0..original_data.len() {
            let loss_at = |delta: f64| -> Result<f64, GradCheckError> {
                let mut perturbed = original_data.clone();
                perturbed[elem_idx] += delta;
                let perturbed_tensor = Tensor::new(
                    perturbed.iter().map(|&v| v as f32).collect(),
                    original_input.shape(),
                )?;
                let mut perturbed_inputs = inputs.to_vec();
                perturbed_inputs[i] = perturbed_tensor;
                let out = func(&perturbed_inputs).map_err(GradCheckError::ForwardPassError)?;
                weighted_loss(&out, &seed)
            };
            let loss_plus = loss_at(epsilon)?;
            let loss_minus = loss_at(-epsilon)?;
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_grad = analytical[elem_idx];

            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    value: analytical_grad,
                });
            }
            if !relative_eq!(
                analytical_grad,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical_grad,
                    numerical_grad,
                    difference: (analytical_grad - numerical_grad).abs(),
                });
            }
        }
    }

    Ok(())
}

/// `sum(output * seed)` accumulated in f64.
fn weighted_loss(output: &Tensor, seed: &[f32]) -> Result<f64, GradCheckError> {
    let data = output.get_f32_data();
    if data.len() != seed.len() {
        return Err(GradCheckError::TensorError(GraphAggError::ShapeMismatch {
            expected: vec![seed.len()],
            actual: output.shape(),
            operation: "check_grad loss".to_string(),
        }));
    }
    Ok(data
        .iter()
        .zip(seed)
        .map(|(&o, &s)| o as f64 * s as f64)
        .sum())
}
