//! 2D pooling parameter binding.

use crate::graph::OpDescriptor;
use crate::operator::{Kernel, Operator};
use crate::ops::conv::conv_out_dim;
use crate::ops::{self, BindError, KernelError, Param};
use crate::scope::Scope;
use crate::tensor::{Precision, TensorRef};

/// Pooling reduction selected by the `pooling_type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Max,
    Avg,
}

/// Validated parameter snapshot for a `pool2d` node.
#[derive(Debug)]
pub struct PoolParam {
    input: TensorRef,
    output: TensorRef,
    kind: PoolKind,
    ksize: [usize; 2],
    stride: [usize; 2],
    paddings: [usize; 2],
    global: bool,
    precision: Precision,
}

impl PoolParam {
    pub fn input(&self) -> &TensorRef {
        &self.input
    }

    pub fn output(&self) -> &TensorRef {
        &self.output
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Window size as [height, width]; covers the whole spatial extent when global.
    pub fn ksize(&self) -> [usize; 2] {
        self.ksize
    }

    pub fn stride(&self) -> [usize; 2] {
        self.stride
    }

    pub fn paddings(&self) -> [usize; 2] {
        self.paddings
    }

    pub fn is_global(&self) -> bool {
        self.global
    }
}

impl Param for PoolParam {
    fn op_type() -> &'static str {
        "pool2d"
    }

    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let input = ops::ordinary_input(desc, scope, 0, "X")?;
        let output = ops::output(desc, scope, 0, "Out")?;
        let kind = match ops::attr::<String>(desc, "pooling_type")?.as_str() {
            "max" => PoolKind::Max,
            "avg" => PoolKind::Avg,
            other => {
                return Err(ops::constraint(
                    desc,
                    "pooling_type",
                    "\"max\" or \"avg\"",
                    format!("\"{other}\""),
                ))
            }
        };
        let global = ops::attr_or::<bool>(desc, "global_pooling", false)?;

        let precision = ops::same_precision(desc, &[("X", &input), ("Out", &output)])?;

        let in_dims = input.read().shape().dims().to_vec();
        let out_dims = output.read().shape().dims().to_vec();
        if in_dims.len() != 4 {
            return Err(ops::constraint(
                desc,
                "X",
                "a rank-4 NCHW tensor",
                format!("rank {}", in_dims.len()),
            ));
        }
        let (batch, channels, in_h, in_w) = (in_dims[0], in_dims[1], in_dims[2], in_dims[3]);

        // Global pooling collapses the spatial extent; the window attributes
        // are ignored when present.
        let (ksize, stride, paddings) = if global {
            ([in_h, in_w], [1, 1], [0, 0])
        } else {
            (
                ops::positive_pair(desc, "ksize")?,
                ops::positive_pair(desc, "strides")?,
                ops::int_pair(desc, "paddings")?,
            )
        };

        let out_h = conv_out_dim(in_h, ksize[0], stride[0], 1, paddings[0]).ok_or_else(|| {
            ops::constraint(
                desc,
                "Out",
                "a non-empty spatial extent",
                format!("window {} over extent {in_h} with padding {}", ksize[0], paddings[0]),
            )
        })?;
        let out_w = conv_out_dim(in_w, ksize[1], stride[1], 1, paddings[1]).ok_or_else(|| {
            ops::constraint(
                desc,
                "Out",
                "a non-empty spatial extent",
                format!("window {} over extent {in_w} with padding {}", ksize[1], paddings[1]),
            )
        })?;
        let expected = [batch, channels, out_h, out_w];
        if out_dims != expected {
            return Err(ops::constraint(
                desc,
                "Out",
                format!("shape {expected:?}"),
                format!("shape {out_dims:?}"),
            ));
        }

        Ok(PoolParam {
            input,
            output,
            kind,
            ksize,
            stride,
            paddings,
            global,
            precision,
        })
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

/// Reference pooling kernel.
#[derive(Default)]
pub struct Pool2dKernel;

impl Kernel for Pool2dKernel {
    type Param = PoolParam;

    fn compute(&self, param: &PoolParam) -> Result<(), KernelError> {
        crate::kernels::pool2d(param)
    }
}

/// A `pool2d` node bound and ready to run.
pub type PoolOperator = Operator<Pool2dKernel>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{Shape, Tensor};

    fn pool_scope(out_dims: Vec<usize>) -> Scope {
        let mut scope = Scope::new();
        scope.insert_tensor("X", Tensor::zeros(Shape::new(vec![1, 2, 4, 4]), Precision::F32));
        scope.insert_tensor("Out", Tensor::zeros(Shape::new(out_dims), Precision::F32));
        scope
    }

    fn pool_desc() -> OpDescriptor {
        OpDescriptor::new("pool2d")
            .with_input("X")
            .with_output("Out")
            .with_attr("pooling_type", "max")
            .with_attr("ksize", vec![2i64, 2])
            .with_attr("strides", vec![2i64, 2])
            .with_attr("paddings", vec![0i64, 0])
    }

    #[test]
    fn windowed_pooling_binds() {
        let param = PoolParam::bind(&pool_desc(), &pool_scope(vec![1, 2, 2, 2])).unwrap();
        assert_eq!(param.kind(), PoolKind::Max);
        assert_eq!(param.ksize(), [2, 2]);
        assert!(!param.is_global());
    }

    #[test]
    fn global_pooling_ignores_window_attrs() {
        let desc = OpDescriptor::new("pool2d")
            .with_input("X")
            .with_output("Out")
            .with_attr("pooling_type", "avg")
            .with_attr("global_pooling", true);
        let param = PoolParam::bind(&desc, &pool_scope(vec![1, 2, 1, 1])).unwrap();
        assert!(param.is_global());
        assert_eq!(param.ksize(), [4, 4]);
    }

    #[test]
    fn unknown_pooling_type_is_rejected() {
        let desc = pool_desc().with_attr("pooling_type", "median");
        let err = PoolParam::bind(&desc, &pool_scope(vec![1, 2, 2, 2])).unwrap_err();
        match err {
            BindError::TypeMismatch { key, found, .. } => {
                assert_eq!(key, "pooling_type");
                assert_eq!(found, "\"median\"");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn output_shape_is_checked() {
        let err = PoolParam::bind(&pool_desc(), &pool_scope(vec![1, 2, 3, 3])).unwrap_err();
        assert!(
            matches!(err, BindError::TypeMismatch { ref key, .. } if key == "Out"),
            "unexpected error {err:?}"
        );
    }
}
