use super::*;
use crate::aggr::base::AggrArgs;
use crate::autograd::grad_check::check_grad;
use crate::error::{GroupCountRequirement, WeightFault};
use crate::ops::reduction::sum_op;
use crate::utils::testing::{check_tensor_near, init_test_logger};

/// Rows 0..3 in group 0, row 3 alone in group 1, group 2 empty.
fn sample() -> (Tensor, [usize; 4]) {
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 6.0, 5.0, 4.0, 7.0, 8.0], vec![4, 2]).unwrap();
    (x, [0, 0, 0, 1])
}

#[test]
fn test_simple_reductions() -> Result<(), GraphAggError> {
    init_test_logger();
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    let cases: Vec<(Box<dyn Aggregation>, [f32; 6])> = vec![
        (Box::new(SumAggregation), [9.0, 12.0, 7.0, 8.0, 0.0, 0.0]),
        (Box::new(MeanAggregation), [3.0, 4.0, 7.0, 8.0, 0.0, 0.0]),
        (Box::new(MaxAggregation), [5.0, 6.0, 7.0, 8.0, 0.0, 0.0]),
        (Box::new(MinAggregation), [1.0, 2.0, 7.0, 8.0, 0.0, 0.0]),
        (Box::new(MulAggregation), [15.0, 48.0, 7.0, 8.0, 1.0, 1.0]),
    ];
    for (aggr, expected) in cases {
        let out = aggr.aggregate(&x, &args)?;
        check_tensor_near(&out, &[3, 2], &expected, 1e-5);
    }
    Ok(())
}

#[test]
fn test_display_names() {
    assert_eq!(SumAggregation.to_string(), "SumAggregation()");
    assert_eq!(MeanAggregation::new().to_string(), "MeanAggregation()");
    assert_eq!(MulAggregation.to_string(), "MulAggregation()");
    assert_eq!(VarAggregation::new(true).to_string(), "VarAggregation()");
    assert_eq!(StdAggregation::default().to_string(), "StdAggregation()");
    assert_eq!(
        WeightedMeanAggregation.to_string(),
        "WeightedMeanAggregation()"
    );
}

#[test]
fn test_mul_rejects_pointer_only() {
    let (x, _) = sample();
    let ptr = [0, 3, 4];
    let err = MulAggregation
        .aggregate(&x, &AggrArgs::new().with_ptr(&ptr))
        .unwrap_err();
    assert!(matches!(err, GraphAggError::UnsupportedAddressingMode(_)));
}

#[test]
fn test_var_matches_two_pass_population_variance() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    let out = VarAggregation::default().aggregate(&x, &args)?;
    // Group 0, column 0: {1, 3, 5}, mean 3, var 8/3. Column 1: {2, 6, 4}, var 8/3.
    check_tensor_near(
        &out,
        &[3, 2],
        &[8.0 / 3.0, 8.0 / 3.0, 0.0, 0.0, 0.0, 0.0],
        1e-5,
    );
    Ok(())
}

#[test]
fn test_var_semi_grad_same_values() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    let full = VarAggregation::new(false).aggregate(&x, &args)?;
    let semi = VarAggregation::new(true).aggregate(&x, &args)?;
    check_tensor_near(&semi, &[3, 2], &full.get_f32_data(), 1e-6);
    Ok(())
}

#[test]
fn test_var_grad_check() {
    let (x, index) = sample();
    x.set_requires_grad(true).unwrap();
    let output_grad = Tensor::new(vec![1.0, -0.5, 0.3, 2.0, 0.7, -1.1], vec![3, 2]).unwrap();
    let result = check_grad(
        |inputs| {
            let args = AggrArgs::new().with_index(&index).with_dim_size(3);
            VarAggregation::default().aggregate(&inputs[0], &args)
        },
        &[x],
        &output_grad,
        1e-2,
        2e-2,
    );
    assert!(result.is_ok(), "var grad check failed: {:?}", result.err());
}

#[test]
fn test_std_zero_for_degenerate_groups() -> Result<(), GraphAggError> {
    // Group 0 is constant, group 1 a singleton, group 2 empty.
    let x = Tensor::new(vec![2.0, 2.0, 2.0, 9.0], vec![4, 1])?;
    x.set_requires_grad(true)?;
    let index = [0, 0, 0, 1];
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    let out = StdAggregation::default().aggregate(&x, &args)?;
    check_tensor_near(&out, &[3, 1], &[0.0, 0.0, 0.0], 0.0);

    sum_op(&out)?.backward(None)?;
    let grad = x.grad().unwrap();
    assert!(grad.all_finite());
    Ok(())
}

#[test]
fn test_std_value() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    let out = StdAggregation::new(false).aggregate(&x, &args)?;
    let expected = (8.0f32 / 3.0).sqrt();
    check_tensor_near(&out, &[3, 2], &[expected, expected, 0.0, 0.0, 0.0, 0.0], 1e-5);
    Ok(())
}

#[test]
fn test_std_keeps_small_deviations() -> Result<(), GraphAggError> {
    let x = Tensor::new(vec![0.0, 0.004], vec![2, 1])?;
    x.set_requires_grad(true)?;
    let out = StdAggregation::default().aggregate(&x, &AggrArgs::new())?;
    check_tensor_near(&out, &[1, 1], &[0.002], 1e-6);

    sum_op(&out)?.backward(None)?;
    check_tensor_near(&x.grad().unwrap(), &[2, 1], &[-0.5, 0.5], 1e-3);
    Ok(())
}

#[test]
fn test_std_empty_input() -> Result<(), GraphAggError> {
    let x = Tensor::new(vec![], vec![0, 16])?;
    let index: [usize; 0] = [];
    let args = AggrArgs::new().with_index(&index).with_dim_size(5);
    let out = StdAggregation::default().aggregate(&x, &args)?;
    check_tensor_near(&out, &[5, 16], &[0.0; 80], 0.0);
    Ok(())
}

#[test]
fn test_weighted_mean() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let weight = Tensor::new(vec![1.0, 0.0, 3.0, 2.0], vec![4])?;
    let args = AggrArgs::new().with_index(&index).with_dim_size(3);
    let out = WeightedMeanAggregation.aggregate_weighted(&x, Some(&weight), &args)?;
    // Group 0: 1*[1, 2] + 0*[3, 6] + 3*[5, 4]; group 1: 2*[7, 8]; group 2 empty.
    check_tensor_near(&out, &[3, 2], &[16.0, 14.0, 14.0, 16.0, 0.0, 0.0], 1e-5);
    Ok(())
}

#[test]
fn test_weighted_mean_is_not_normalized() -> Result<(), GraphAggError> {
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![6, 1])?;
    let weight = Tensor::new(vec![2.0, 2.0, 1.0, 1.0, 1.0, 1.0], vec![6])?;
    let index = [0, 0, 1, 1, 1, 2];
    let args = AggrArgs::new().with_index(&index);
    let out = WeightedMeanAggregation.aggregate_weighted(&x, Some(&weight), &args)?;
    check_tensor_near(&out, &[3, 1], &[6.0, 12.0, 6.0], 1e-6);
    Ok(())
}

#[test]
fn test_weighted_mean_cancelling_weights() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let weight = Tensor::new(vec![1.0, -1.0, 0.0, 0.0], vec![4])?;
    let args = AggrArgs::new().with_index(&index).with_dim_size(2);
    let out = WeightedMeanAggregation.aggregate_weighted(&x, Some(&weight), &args)?;
    check_tensor_near(&out, &[2, 2], &[-2.0, -4.0, 0.0, 0.0], 1e-6);
    Ok(())
}

#[test]
fn test_weighted_mean_requires_weight() {
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index);
    assert!(matches!(
        WeightedMeanAggregation.aggregate(&x, &args),
        Err(GraphAggError::UnsupportedAddressingMode(_))
    ));
    assert!(matches!(
        WeightedMeanAggregation.aggregate_weighted(&x, None, &args),
        Err(GraphAggError::UnsupportedAddressingMode(_))
    ));
}

#[test]
fn test_weight_validation_order() {
    let (x, index) = sample();
    let bad_rank = Tensor::new(vec![1.0; 4], vec![4, 1]).unwrap();
    let args = AggrArgs::new().with_index(&index);
    assert_eq!(
        WeightedMeanAggregation
            .aggregate_weighted(&x, Some(&bad_rank), &args)
            .unwrap_err(),
        GraphAggError::MalformedWeight(WeightFault::Rank(2))
    );
    let short = Tensor::new(vec![1.0; 3], vec![3]).unwrap();
    assert_eq!(
        WeightedMeanAggregation
            .aggregate_weighted(&x, Some(&short), &args)
            .unwrap_err(),
        GraphAggError::MalformedWeight(WeightFault::Length {
            elements: 4,
            weights: 3
        })
    );
    // The axis is validated before the weight.
    assert_eq!(
        WeightedMeanAggregation
            .aggregate_weighted(&x, Some(&short), &args.with_dim(-3))
            .unwrap_err(),
        GraphAggError::InvalidDimension { dim: -3, rank: 2 }
    );
}

#[test]
fn test_weighted_mean_invalid_group_count() {
    let (x, _) = sample();
    let index = [0, 1, 2, 2];
    let weight = Tensor::new(vec![0.25; 4], vec![4]).unwrap();
    let args = AggrArgs::new().with_index(&index).with_dim_size(2);
    assert_eq!(
        WeightedMeanAggregation
            .aggregate_weighted(&x, Some(&weight), &args)
            .unwrap_err(),
        GraphAggError::InvalidGroupCount {
            got: 2,
            expected: GroupCountRequirement::AtLeast(3)
        }
    );
}
