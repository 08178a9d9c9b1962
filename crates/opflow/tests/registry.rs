//! Exercises registry extension: a downstream crate plugging in a new
//! operator kind without touching the built-in table.

use opflow::registry::{build_one, has_op_type, list_op_types, register_operator};
use opflow::tensor::{Precision, Shape, Tensor, TensorRef};
use opflow::{
    build_operator, BindError, ErasedOperator, Kernel, KernelError, OpDescriptor, Param, Scope,
};

/// Parameter for a toy `scale` operator: one input, one output, a float factor.
struct ScaleParam {
    input: TensorRef,
    output: TensorRef,
    factor: f32,
    precision: Precision,
}

impl Param for ScaleParam {
    fn op_type() -> &'static str {
        "scale"
    }

    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let input = opflow::ops::ordinary_input(desc, scope, 0, "X")?;
        let output = opflow::ops::output(desc, scope, 0, "Out")?;
        let factor = opflow::ops::attr::<f32>(desc, "factor")?;
        let precision = opflow::ops::same_precision(desc, &[("X", &input), ("Out", &output)])?;
        Ok(ScaleParam {
            input,
            output,
            factor,
            precision,
        })
    }

    fn precision(&self) -> Precision {
        self.precision
    }
}

#[derive(Default)]
struct ScaleKernel;

impl Kernel for ScaleKernel {
    type Param = ScaleParam;

    fn compute(&self, param: &ScaleParam) -> Result<(), KernelError> {
        let values: Vec<f32> = {
            let guard = param.input.read();
            let data = guard
                .as_slice::<f32>()
                .ok_or(KernelError::UnsupportedPrecision {
                    op: "scale",
                    precision: guard.precision(),
                })?;
            data.iter().map(|&v| v * param.factor).collect()
        };
        let mut guard = param.output.write();
        let precision = guard.precision();
        let out = guard
            .as_mut_slice::<f32>()
            .ok_or(KernelError::UnsupportedPrecision {
                op: "scale",
                precision,
            })?;
        out.copy_from_slice(&values);
        Ok(())
    }
}

#[test]
fn registered_kind_becomes_constructible() {
    assert!(!has_op_type("scale"));
    assert!(register_operator("scale", build_one::<ScaleKernel>));
    assert!(has_op_type("scale"));
    assert!(list_op_types().contains(&"scale".to_string()));

    let mut scope = Scope::new();
    scope.insert_tensor(
        "X",
        Tensor::from_vec(Shape::new(vec![3]), vec![1.0, 2.0, 3.0]).unwrap(),
    );
    let out = scope.insert_tensor("Out", Tensor::zeros(Shape::new(vec![3]), Precision::F32));

    let desc = OpDescriptor::new("scale")
        .with_input("X")
        .with_output("Out")
        .with_attr("factor", 2.5f32);
    let operator = build_operator(&desc, &scope).expect("scale should bind");
    assert_eq!(operator.op_type(), "scale");
    operator.run().unwrap();
    assert_eq!(out.read().as_slice::<f32>().unwrap(), &[2.5, 5.0, 7.5]);
}

#[test]
fn builtin_kinds_are_listed() {
    let kinds = list_op_types();
    for kind in ["conv2d", "pool2d", "relu", "elementwise_add", "split"] {
        assert!(kinds.contains(&kind.to_string()), "missing '{kind}'");
    }
}

#[test]
fn unknown_kind_reports_its_tag() {
    let err = build_operator(&OpDescriptor::new("layer_norm"), &Scope::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no operator kind is registered for op type 'layer_norm'"
    );
}
