use super::*;
use crate::aggr::base::AggrArgs;
use crate::aggr::resolve_groups;
use crate::autograd::grad_check::check_grad;
use crate::nn::init::fill_;
use crate::ops::reduction::sum_op;
use crate::utils::testing::check_tensor_near;

fn expected_softmax_sum(values: &[f32], t: f32) -> f32 {
    let max = values.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v * t));
    let exps: Vec<f32> = values.iter().map(|&v| (v * t - max).exp()).collect();
    let denominator: f32 = exps.iter().sum::<f32>() + 1e-16;
    values.iter().zip(&exps).map(|(&v, &e)| v * e / denominator).sum()
}

#[test]
fn test_group_softmax_sums_to_one() -> Result<(), GraphAggError> {
    let x = Tensor::new(vec![1.0, -2.0, 0.5, 3.0, 1000.0], vec![5, 1])?;
    let index = [0, 0, 1, 1, 1];
    let groups = resolve_groups(&[5, 1], &AggrArgs::new().with_index(&index))?;
    let weights = group_softmax(&x, &groups)?;
    let w = weights.get_f32_data();
    assert!(weights.all_finite());
    assert!((w[0] + w[1] - 1.0).abs() < 1e-6);
    assert!((w[2] + w[3] + w[4] - 1.0).abs() < 1e-6);
    assert!((w[4] - 1.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_softmax_aggregation_values() -> Result<(), GraphAggError> {
    let x = Tensor::new(vec![1.0, 2.0, 3.0, -1.0], vec![4, 1])?;
    let index = [0, 0, 0, 1];
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    for t in [1.0f32, 0.5] {
        let aggr = SoftmaxAggregation::new(t, false, false, None)?;
        let out = aggr.aggregate(&x, &args)?;
        check_tensor_near(
            &out,
            &[3, 1],
            &[expected_softmax_sum(&[1.0, 2.0, 3.0], t), -1.0, 0.0],
            1e-5,
        );
    }
    Ok(())
}

#[test]
fn test_softmax_learn_and_semi_grad_conflict() {
    assert!(matches!(
        SoftmaxAggregation::new(1.0, true, true, Some(1)),
        Err(GraphAggError::InvalidConfiguration(_))
    ));
    assert!(SoftmaxAggregation::new(1.0, false, true, None).is_ok());
}

#[test]
fn test_softmax_display() -> Result<(), GraphAggError> {
    assert_eq!(
        SoftmaxAggregation::default().to_string(),
        "SoftmaxAggregation(learn=false)"
    );
    assert_eq!(
        SoftmaxAggregation::new(1.0, true, false, Some(1))?.to_string(),
        "SoftmaxAggregation(learn=true)"
    );
    Ok(())
}

#[test]
fn test_softmax_lazy_temperature() -> Result<(), GraphAggError> {
    let mut aggr = SoftmaxAggregation::new(1.0, true, false, None)?;
    assert!(aggr.t().is_none());
    assert!(aggr.parameters().is_empty());

    let x = crate::tensor::randn(&[6, 16])?;
    let index = [0, 0, 1, 1, 2, 2];
    let args = AggrArgs::new().with_index(&index);
    let out = aggr.aggregate(&x, &args)?;
    assert_eq!(out.shape(), vec![3, 16]);
    let t = aggr.t().expect("temperature materialized").clone();
    assert_eq!(t.shape(), vec![16]);
    assert_eq!(aggr.parameters().len(), 1);

    sum_op(&out)?.backward(None)?;
    assert!(t.grad().unwrap().all_finite());

    fill_(&t, 3.0)?;
    aggr.reset_parameters()?;
    assert_eq!(t.get_f32_data(), vec![1.0; 16]);
    Ok(())
}

#[test]
fn test_softmax_semi_grad_blocks_weight_gradient() -> Result<(), GraphAggError> {
    // With detached weights the gradient is just the softmax weight itself.
    let x = Tensor::new(vec![0.0, 2f32.ln()], vec![2, 1])?;
    x.set_requires_grad(true)?;
    let aggr = SoftmaxAggregation::new(1.0, false, true, None)?;
    let out = aggr.aggregate(&x, &AggrArgs::new())?;
    sum_op(&out)?.backward(None)?;
    check_tensor_near(&x.grad().unwrap(), &[2, 1], &[1.0 / 3.0, 2.0 / 3.0], 1e-5);
    Ok(())
}

#[test]
fn test_softmax_grad_check() {
    let x = Tensor::new(vec![0.3, -1.2, 0.8, 2.1, -0.5, 1.7], vec![3, 2]).unwrap();
    x.set_requires_grad(true).unwrap();
    let output_grad = Tensor::new(vec![1.0, -0.5, 0.3, 2.0], vec![2, 2]).unwrap();
    let aggr = SoftmaxAggregation::new(0.7, false, false, None).unwrap();
    let result = check_grad(
        |inputs| {
            let index = [0, 1, 0];
            aggr.aggregate(&inputs[0], &AggrArgs::new().with_index(&index))
        },
        &[x],
        &output_grad,
        1e-3,
        2e-2,
    );
    assert!(result.is_ok(), "softmax grad check failed: {:?}", result.err());
}
