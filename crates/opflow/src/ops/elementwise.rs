//! Elementwise activation and binary parameter binding.

use crate::graph::OpDescriptor;
use crate::operator::{Kernel, Operator};
use crate::ops::{self, BindError, KernelError, Param};
use crate::scope::Scope;
use crate::tensor::{Precision, TensorRef};

/// Validated parameter snapshot for a `relu` node.
#[derive(Debug)]
pub struct ReluParam {
    input: TensorRef,
    output: TensorRef,
    precision: Precision,
}

impl ReluParam {
    pub fn input(&self) -> &TensorRef {
        &self.input
    }

    pub fn output(&self) -> &TensorRef {
        &self.output
    }
}

impl Param for ReluParam {
    fn op_type() -> &'static str {
        "relu"
    }

    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let input = ops::ordinary_input(desc, scope, 0, "X")?;
        let output = ops::output(desc, scope, 0, "Out")?;
        let precision = ops::same_precision(desc, &[("X", &input), ("Out", &output)])?;
        let in_dims = input.read().shape().dims().to_vec();
        let out_dims = output.read().shape().dims().to_vec();
        if in_dims != out_dims {
            return Err(ops::constraint(
                desc,
                "Out",
                format!("shape {in_dims:?}"),
                format!("shape {out_dims:?}"),
            ));
        }
        Ok(ReluParam {
            input,
            output,
            precision,
        })
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

#[derive(Default)]
pub struct ReluKernel;

impl Kernel for ReluKernel {
    type Param = ReluParam;

    fn compute(&self, param: &ReluParam) -> Result<(), KernelError> {
        crate::kernels::relu(param)
    }
}

/// A `relu` node bound and ready to run.
pub type ReluOperator = Operator<ReluKernel>;

/// Validated parameter snapshot for an `elementwise_add` node.
///
/// Only same-shape operands are supported here; `axis` is accepted for wire
/// compatibility and validated against the operand rank.
#[derive(Debug)]
pub struct ElementwiseAddParam {
    lhs: TensorRef,
    rhs: TensorRef,
    output: TensorRef,
    axis: i64,
    precision: Precision,
}

impl ElementwiseAddParam {
    pub fn lhs(&self) -> &TensorRef {
        &self.lhs
    }

    pub fn rhs(&self) -> &TensorRef {
        &self.rhs
    }

    pub fn output(&self) -> &TensorRef {
        &self.output
    }

    pub fn axis(&self) -> i64 {
        self.axis
    }
}

impl Param for ElementwiseAddParam {
    fn op_type() -> &'static str {
        "elementwise_add"
    }

    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let lhs = ops::ordinary_input(desc, scope, 0, "X")?;
        let rhs = ops::ordinary_input(desc, scope, 1, "Y")?;
        let output = ops::output(desc, scope, 0, "Out")?;
        let axis = ops::attr_or::<i64>(desc, "axis", -1)?;
        let precision =
            ops::same_precision(desc, &[("X", &lhs), ("Y", &rhs), ("Out", &output)])?;

        let lhs_dims = lhs.read().shape().dims().to_vec();
        let rhs_dims = rhs.read().shape().dims().to_vec();
        let out_dims = output.read().shape().dims().to_vec();
        if rhs_dims != lhs_dims {
            return Err(ops::constraint(
                desc,
                "Y",
                format!("shape {lhs_dims:?}"),
                format!("shape {rhs_dims:?}"),
            ));
        }
        if out_dims != lhs_dims {
            return Err(ops::constraint(
                desc,
                "Out",
                format!("shape {lhs_dims:?}"),
                format!("shape {out_dims:?}"),
            ));
        }
        let rank = lhs_dims.len() as i64;
        if axis != -1 && !(0..rank).contains(&axis) {
            return Err(ops::constraint(
                desc,
                "axis",
                format!("-1 or an axis below rank {rank}"),
                axis.to_string(),
            ));
        }

        Ok(ElementwiseAddParam {
            lhs,
            rhs,
            output,
            axis,
            precision,
        })
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

#[derive(Default)]
pub struct ElementwiseAddKernel;

impl Kernel for ElementwiseAddKernel {
    type Param = ElementwiseAddParam;

    fn compute(&self, param: &ElementwiseAddParam) -> Result<(), KernelError> {
        crate::kernels::elementwise_add(param)
    }
}

/// An `elementwise_add` node bound and ready to run.
pub type ElementwiseAddOperator = Operator<ElementwiseAddKernel>;
