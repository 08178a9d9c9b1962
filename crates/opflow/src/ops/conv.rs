//! 2D convolution parameter binding.
//!
//! Activations are NCHW, filters OIHW ([C_out, C_in/groups, KH, KW]). The
//! declared output tensor must already have the computed convolution output
//! shape; the mismatch is rejected at bind time, before any kernel touches
//! the buffers.

use crate::graph::OpDescriptor;
use crate::operator::{Kernel, Operator};
use crate::ops::{self, BindError, KernelError, Param};
use crate::scope::Scope;
use crate::tensor::{Precision, TensorRef};

/// Validated parameter snapshot for a `conv2d` node.
#[derive(Debug)]
pub struct ConvParam {
    input: TensorRef,
    filter: TensorRef,
    output: TensorRef,
    stride: [usize; 2],
    paddings: [usize; 2],
    dilations: [usize; 2],
    groups: usize,
    precision: Precision,
}

impl ConvParam {
    pub fn input(&self) -> &TensorRef {
        &self.input
    }

    pub fn filter(&self) -> &TensorRef {
        &self.filter
    }

    pub fn output(&self) -> &TensorRef {
        &self.output
    }

    /// Stride as [height, width].
    pub fn stride(&self) -> [usize; 2] {
        self.stride
    }

    /// Symmetric zero padding as [height, width].
    pub fn paddings(&self) -> [usize; 2] {
        self.paddings
    }

    /// Dilation as [height, width].
    pub fn dilations(&self) -> [usize; 2] {
        self.dilations
    }

    pub fn groups(&self) -> usize {
        self.groups
    }
}

impl Param for ConvParam {
    fn op_type() -> &'static str {
        "conv2d"
    }

    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let input = ops::ordinary_input(desc, scope, 0, "Input")?;
        let filter = ops::param_input(desc, scope, "Filter")?;
        let output = ops::output(desc, scope, 0, "Output")?;
        let stride = ops::positive_pair(desc, "stride")?;
        let paddings = ops::int_pair(desc, "paddings")?;
        let dilations = ops::positive_pair(desc, "dilations")?;
        let groups = ops::attr::<i64>(desc, "groups")?;
        if groups < 1 {
            return Err(ops::constraint(
                desc,
                "groups",
                "a positive integer",
                groups.to_string(),
            ));
        }
        let groups = groups as usize;

        let precision = ops::same_precision(
            desc,
            &[("Input", &input), ("Filter", &filter), ("Output", &output)],
        )?;

        let in_dims = input.read().shape().dims().to_vec();
        let filter_dims = filter.read().shape().dims().to_vec();
        let out_dims = output.read().shape().dims().to_vec();
        if in_dims.len() != 4 {
            return Err(ops::constraint(
                desc,
                "Input",
                "a rank-4 NCHW tensor",
                format!("rank {}", in_dims.len()),
            ));
        }
        if filter_dims.len() != 4 {
            return Err(ops::constraint(
                desc,
                "Filter",
                "a rank-4 OIHW tensor",
                format!("rank {}", filter_dims.len()),
            ));
        }
        let (batch, c_in, in_h, in_w) = (in_dims[0], in_dims[1], in_dims[2], in_dims[3]);
        let (c_out, f_in, k_h, k_w) = (
            filter_dims[0],
            filter_dims[1],
            filter_dims[2],
            filter_dims[3],
        );
        if c_in % groups != 0 {
            return Err(ops::constraint(
                desc,
                "groups",
                format!("a divisor of input channels ({c_in})"),
                groups.to_string(),
            ));
        }
        if c_out % groups != 0 {
            return Err(ops::constraint(
                desc,
                "groups",
                format!("a divisor of filter output channels ({c_out})"),
                groups.to_string(),
            ));
        }
        if f_in != c_in / groups {
            return Err(ops::constraint(
                desc,
                "Filter",
                format!("input-channel extent {} ({c_in} channels / {groups} groups)", c_in / groups),
                f_in.to_string(),
            ));
        }

        let out_h = conv_out_dim(in_h, k_h, stride[0], dilations[0], paddings[0])
            .ok_or_else(|| empty_extent(desc, in_h, k_h, dilations[0], paddings[0]))?;
        let out_w = conv_out_dim(in_w, k_w, stride[1], dilations[1], paddings[1])
            .ok_or_else(|| empty_extent(desc, in_w, k_w, dilations[1], paddings[1]))?;
        let expected = [batch, c_out, out_h, out_w];
        if out_dims != expected {
            return Err(ops::constraint(
                desc,
                "Output",
                format!("shape {expected:?}"),
                format!("shape {out_dims:?}"),
            ));
        }

        Ok(ConvParam {
            input,
            filter,
            output,
            stride,
            paddings,
            dilations,
            groups,
            precision,
        })
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

/// Output extent of one spatial axis, or `None` when the window overruns
/// the padded input.
pub(crate) fn conv_out_dim(
    input: usize,
    window: usize,
    stride: usize,
    dilation: usize,
    pad: usize,
) -> Option<usize> {
    let effective = dilation * (window - 1) + 1;
    let padded = input + 2 * pad;
    if padded < effective {
        return None;
    }
    Some((padded - effective) / stride + 1)
}

fn empty_extent(
    desc: &OpDescriptor,
    input: usize,
    window: usize,
    dilation: usize,
    pad: usize,
) -> BindError {
    ops::constraint(
        desc,
        "Output",
        "a non-empty spatial extent",
        format!("window {window} (dilation {dilation}) over extent {input} with padding {pad}"),
    )
}

/// Reference direct convolution kernel.
#[derive(Default)]
pub struct Conv2dKernel;

impl Kernel for Conv2dKernel {
    type Param = ConvParam;

    fn compute(&self, param: &ConvParam) -> Result<(), KernelError> {
        crate::kernels::conv2d(param)
    }
}

/// A `conv2d` node bound and ready to run.
pub type ConvOperator = Operator<Conv2dKernel>;
