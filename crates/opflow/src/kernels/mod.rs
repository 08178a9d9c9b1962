//! Portable reference kernels for the built-in operator kinds.
//!
//! These are deliberately naive f32 loop implementations: they define the
//! numerical contract a tuned backend must reproduce. Each kernel copies its
//! input data out under a read guard before taking the output write guard,
//! so a descriptor that aliases an input with an output cannot deadlock.

mod conv;
mod elementwise;
mod pool;
mod split;

pub use conv::conv2d;
pub use elementwise::{elementwise_add, relu};
pub use pool::pool2d;
pub use split::split;

use crate::ops::KernelError;
use crate::tensor::TensorRef;

/// Snapshots a tensor's dims and f32 payload under a short-lived read guard.
fn read_f32(op: &'static str, tensor: &TensorRef) -> Result<(Vec<usize>, Vec<f32>), KernelError> {
    let guard = tensor.read();
    let data = guard
        .as_slice::<f32>()
        .ok_or(KernelError::UnsupportedPrecision {
            op,
            precision: guard.precision(),
        })?;
    Ok((guard.shape().dims().to_vec(), data.to_vec()))
}

/// Writes a computed payload into the output tensor under a write guard.
fn write_f32(op: &'static str, tensor: &TensorRef, values: &[f32]) -> Result<(), KernelError> {
    let mut guard = tensor.write();
    let precision = guard.precision();
    let out = guard
        .as_mut_slice::<f32>()
        .ok_or(KernelError::UnsupportedPrecision { op, precision })?;
    if out.len() != values.len() {
        return Err(KernelError::Compute {
            op,
            reason: format!(
                "output buffer holds {} elements, kernel produced {}",
                out.len(),
                values.len()
            ),
        });
    }
    out.copy_from_slice(values);
    Ok(())
}
