//! Reference split along an arbitrary axis.

use super::{read_f32, write_f32};
use crate::ops::split::SplitParam;
use crate::ops::KernelError;

const OP: &str = "split";

/// Copies contiguous sections of the input into each output tensor.
pub fn split(param: &SplitParam) -> Result<(), KernelError> {
    let (in_dims, x) = read_f32(OP, param.input())?;
    let axis = param.axis();
    let outer: usize = in_dims[..axis].iter().product();
    let inner: usize = in_dims[axis + 1..].iter().product();
    let axis_extent = in_dims[axis];

    let mut offset = 0usize;
    for (tensor, &section) in param.outputs().iter().zip(param.sections()) {
        let mut out = Vec::with_capacity(outer * section * inner);
        for o in 0..outer {
            let base = (o * axis_extent + offset) * inner;
            out.extend_from_slice(&x[base..base + section * inner]);
        }
        write_f32(OP, tensor, &out)?;
        offset += section;
    }
    Ok(())
}
