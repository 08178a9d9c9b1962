//! Split parameter binding: one input carved into sections along an axis.

use crate::graph::OpDescriptor;
use crate::operator::{Kernel, Operator};
use crate::ops::{self, BindError, KernelError, Param};
use crate::scope::Scope;
use crate::tensor::{Precision, TensorRef};

/// Validated parameter snapshot for a `split` node.
///
/// The sections must cover the input exactly: their count equals the output
/// count and their sum equals the input extent along the split axis.
#[derive(Debug)]
pub struct SplitParam {
    input: TensorRef,
    outputs: Vec<TensorRef>,
    axis: usize,
    sections: Vec<usize>,
    precision: Precision,
}

impl SplitParam {
    pub fn input(&self) -> &TensorRef {
        &self.input
    }

    pub fn outputs(&self) -> &[TensorRef] {
        &self.outputs
    }

    /// Normalized (non-negative) split axis.
    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn sections(&self) -> &[usize] {
        &self.sections
    }
}

impl Param for SplitParam {
    fn op_type() -> &'static str {
        "split"
    }

    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let input = ops::ordinary_input(desc, scope, 0, "X")?;
        if desc.outputs().is_empty() {
            return Err(BindError::MissingOutput {
                op: desc.op_type().to_string(),
                role: "Out0".to_string(),
                name: "?".to_string(),
            });
        }
        let outputs = ops::all_outputs(desc, scope)?;

        let in_dims = input.read().shape().dims().to_vec();
        let rank = in_dims.len() as i64;
        let raw_axis = ops::attr::<i64>(desc, "axis")?;
        // Negative axes count from the back.
        let axis = if raw_axis < 0 { raw_axis + rank } else { raw_axis };
        if !(0..rank).contains(&axis) {
            return Err(ops::constraint(
                desc,
                "axis",
                format!("an axis within rank {rank}"),
                raw_axis.to_string(),
            ));
        }
        let axis = axis as usize;

        let raw_sections = ops::attr::<Vec<i64>>(desc, "sections")?;
        if raw_sections.len() != outputs.len() {
            return Err(ops::constraint(
                desc,
                "sections",
                format!("one section per output ({} outputs)", outputs.len()),
                format!("{} sections", raw_sections.len()),
            ));
        }
        if raw_sections.iter().any(|&s| s < 1) {
            return Err(ops::constraint(
                desc,
                "sections",
                "strictly positive section sizes",
                format!("{raw_sections:?}"),
            ));
        }
        let sections: Vec<usize> = raw_sections.iter().map(|&s| s as usize).collect();
        let sum: usize = sections.iter().sum();
        if sum != in_dims[axis] {
            return Err(ops::constraint(
                desc,
                "sections",
                format!("sections summing to the axis extent ({})", in_dims[axis]),
                format!("sum {sum}"),
            ));
        }

        let mut roles: Vec<(String, &TensorRef)> = vec![("X".to_string(), &input)];
        for (index, tensor) in outputs.iter().enumerate() {
            roles.push((format!("Out{index}"), tensor));
        }
        let role_refs: Vec<(&str, &TensorRef)> =
            roles.iter().map(|(role, t)| (role.as_str(), *t)).collect();
        let precision = ops::same_precision(desc, &role_refs)?;

        for (index, (tensor, &section)) in outputs.iter().zip(sections.iter()).enumerate() {
            let mut expected = in_dims.clone();
            expected[axis] = section;
            let out_dims = tensor.read().shape().dims().to_vec();
            if out_dims != expected {
                return Err(ops::constraint(
                    desc,
                    &format!("Out{index}"),
                    format!("shape {expected:?}"),
                    format!("shape {out_dims:?}"),
                ));
            }
        }

        Ok(SplitParam {
            input,
            outputs,
            axis,
            sections,
            precision,
        })
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

#[derive(Default)]
pub struct SplitKernel;

impl Kernel for SplitKernel {
    type Param = SplitParam;

    fn compute(&self, param: &SplitParam) -> Result<(), KernelError> {
        crate::kernels::split(param)
    }
}

/// A `split` node bound and ready to run.
pub type SplitOperator = Operator<SplitKernel>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{Shape, Tensor};

    fn split_scope() -> Scope {
        let mut scope = Scope::new();
        scope.insert_tensor("X", Tensor::zeros(Shape::new(vec![2, 3]), Precision::F32));
        scope.insert_tensor("A", Tensor::zeros(Shape::new(vec![2, 1]), Precision::F32));
        scope.insert_tensor("B", Tensor::zeros(Shape::new(vec![2, 2]), Precision::F32));
        scope
    }

    fn split_desc(axis: i64) -> OpDescriptor {
        OpDescriptor::new("split")
            .with_input("X")
            .with_output("A")
            .with_output("B")
            .with_attr("axis", axis)
            .with_attr("sections", vec![1i64, 2])
    }

    #[test]
    fn sections_cover_the_axis() {
        let param = SplitParam::bind(&split_desc(1), &split_scope()).unwrap();
        assert_eq!(param.axis(), 1);
        assert_eq!(param.sections(), [1, 2]);
        assert_eq!(param.outputs().len(), 2);
    }

    #[test]
    fn negative_axis_counts_from_the_back() {
        let param = SplitParam::bind(&split_desc(-1), &split_scope()).unwrap();
        assert_eq!(param.axis(), 1);
    }

    #[test]
    fn sections_must_sum_to_the_extent() {
        let desc = split_desc(1).with_attr("sections", vec![2i64, 2]);
        let err = SplitParam::bind(&desc, &split_scope()).unwrap_err();
        match err {
            BindError::TypeMismatch { key, found, .. } => {
                assert_eq!(key, "sections");
                assert_eq!(found, "sum 4");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn section_count_must_match_outputs() {
        let desc = split_desc(1).with_attr("sections", vec![3i64]);
        let err = SplitParam::bind(&desc, &split_scope()).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { ref key, .. } if key == "sections"));
    }

    #[test]
    fn per_output_shapes_are_checked() {
        let mut scope = split_scope();
        scope.insert_tensor("B", Tensor::zeros(Shape::new(vec![2, 3]), Precision::F32));
        let err = SplitParam::bind(&split_desc(1), &scope).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { ref key, .. } if key == "Out1"));
    }
}
