use super::*;

#[test]
fn test_parameter_creation_requires_grad() -> Result<(), GraphAggError> {
    let tensor = crate::tensor::zeros(&[2, 2])?;
    assert!(!tensor.requires_grad(), "Tensor should not require grad initially");
    let param = Parameter::new(tensor)?;
    assert!(param.requires_grad(), "Parameter's tensor should require grad after creation");
    assert!(param.is_leaf());
    Ok(())
}

#[test]
fn test_parameter_deref() -> Result<(), GraphAggError> {
    let param = Parameter::new_with_name(crate::tensor::ones(&[2, 3])?, "t")?;
    assert_eq!(param.shape(), vec![2, 3]);
    assert_eq!(param.name(), Some("t"));
    Ok(())
}

#[test]
fn test_parameter_clone_shares_tensor() -> Result<(), GraphAggError> {
    let param = Parameter::new(crate::tensor::full(&[2], 42.0)?)?;
    let cloned = param.clone();
    assert_eq!(param.get_node_id(), cloned.get_node_id());
    Ok(())
}
