//! Reference elementwise kernels.

use super::{read_f32, write_f32};
use crate::ops::elementwise::{ElementwiseAddParam, ReluParam};
use crate::ops::KernelError;

/// Rectified linear unit applied element by element.
pub fn relu(param: &ReluParam) -> Result<(), KernelError> {
    let (_, x) = read_f32("relu", param.input())?;
    let out: Vec<f32> = x.iter().map(|&v| v.max(0.0)).collect();
    write_f32("relu", param.output(), &out)
}

/// Same-shape elementwise addition.
pub fn elementwise_add(param: &ElementwiseAddParam) -> Result<(), KernelError> {
    let (_, lhs) = read_f32("elementwise_add", param.lhs())?;
    let (_, rhs) = read_f32("elementwise_add", param.rhs())?;
    let out: Vec<f32> = lhs.iter().zip(rhs.iter()).map(|(&a, &b)| a + b).collect();
    write_f32("elementwise_add", param.output(), &out)
}
