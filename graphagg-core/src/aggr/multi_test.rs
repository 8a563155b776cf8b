use super::*;
use crate::aggr::basic::{MaxAggregation, MeanAggregation, MinAggregation, SumAggregation};
use crate::aggr::softmax::SoftmaxAggregation;
use crate::aggr::AggrArgs;
use crate::ops::reduction::sum_op;
use crate::utils::testing::check_tensor_near;

fn sample() -> (Tensor, [usize; 3]) {
    let x = Tensor::new(vec![1.0, -2.0, 3.0, 4.0, 5.0, 0.0], vec![3, 2]).unwrap();
    (x, [0, 0, 1])
}

fn sum_and_max(mode: MultiMode) -> MultiAggregation {
    MultiAggregation::new(vec![Box::new(SumAggregation), Box::new(MaxAggregation)], mode).unwrap()
}

#[test]
fn test_multi_cat() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index);
    let out = sum_and_max(MultiMode::Cat).aggregate(&x, &args)?;
    check_tensor_near(
        &out,
        &[2, 4],
        &[4.0, 2.0, 3.0, 4.0, 5.0, 0.0, 5.0, 0.0],
        1e-6,
    );
    Ok(())
}

#[test]
fn test_multi_elementwise_modes() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    let args = AggrArgs::new().with_index(&index);
    let cases = [
        (MultiMode::Sum, [7.0, 6.0, 10.0, 0.0]),
        (MultiMode::Mean, [3.5, 3.0, 5.0, 0.0]),
        (MultiMode::Max, [4.0, 4.0, 5.0, 0.0]),
        (MultiMode::Min, [3.0, 2.0, 5.0, 0.0]),
    ];
    for (mode, expected) in cases {
        let out = sum_and_max(mode).aggregate(&x, &args)?;
        check_tensor_near(&out, &[2, 2], &expected, 1e-6);
    }
    Ok(())
}

#[test]
fn test_multi_from_names_and_display() -> Result<(), GraphAggError> {
    let aggr = MultiAggregation::from_names(&["mean", "min", "softmax"], "cat".parse()?)?;
    assert_eq!(
        aggr.to_string(),
        "MultiAggregation([\n  MeanAggregation(),\n  MinAggregation(),\n  SoftmaxAggregation(learn=false),\n], mode=cat)"
    );
    assert_eq!(aggr.aggrs().len(), 3);
    Ok(())
}

#[test]
fn test_multi_rejects_empty_and_unknown_mode() {
    assert!(matches!(
        MultiAggregation::new(Vec::new(), MultiMode::Cat),
        Err(GraphAggError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        "concat".parse::<MultiMode>(),
        Err(GraphAggError::InvalidConfiguration(_))
    ));
    assert_eq!("MAX".parse::<MultiMode>().unwrap(), MultiMode::Max);
}

#[test]
fn test_multi_delegates_parameters() -> Result<(), GraphAggError> {
    let softmax = SoftmaxAggregation::new(1.0, true, false, Some(2))?;
    let mut aggr = MultiAggregation::new(
        vec![Box::new(MeanAggregation), Box::new(softmax)],
        MultiMode::Cat,
    )?;
    let params = aggr.parameters();
    assert_eq!(params.len(), 1);

    let (x, index) = sample();
    x.set_requires_grad(true)?;
    let out = aggr.aggregate(&x, &AggrArgs::new().with_index(&index))?;
    assert_eq!(out.shape(), vec![2, 4]);
    sum_op(&out)?.backward(None)?;
    assert!(params[0].grad().unwrap().all_finite());

    crate::nn::init::fill_(&params[0], 4.0)?;
    aggr.reset_parameters()?;
    assert_eq!(params[0].get_f32_data(), vec![1.0, 1.0]);
    Ok(())
}

#[test]
fn test_multi_min_mode_gradient_routes_to_smaller() -> Result<(), GraphAggError> {
    let (x, index) = sample();
    x.set_requires_grad(true)?;
    let aggr = MultiAggregation::new(
        vec![Box::new(MinAggregation), Box::new(SumAggregation)],
        MultiMode::Min,
    )?;
    let out = aggr.aggregate(&x, &AggrArgs::new().with_index(&index))?;
    sum_op(&out)?.backward(None)?;
    assert!(x.grad().unwrap().all_finite());
    Ok(())
}
