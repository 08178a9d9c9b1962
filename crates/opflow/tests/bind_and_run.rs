use anyhow::Result;

use opflow::tensor::{Precision, Shape, Tensor};
use opflow::{bind_graph, build_operator, ErasedOperator, OpDescriptor, Scope};

fn conv_scenario_json() -> &'static str {
    r#"{
        "op": "conv2d",
        "inputs": ["X"],
        "paraInputs": {"Filter": "W"},
        "outputs": ["Y"],
        "attrs": {"stride": [1, 1], "paddings": [0, 0], "dilations": [1, 1], "groups": 1}
    }"#
}

#[test]
fn conv_descriptor_from_wire_form_binds_and_runs() -> Result<()> {
    let desc: OpDescriptor = serde_json::from_str(conv_scenario_json())?;

    let mut rng = rand::thread_rng();
    let mut scope = Scope::new();
    scope.insert_tensor("X", Tensor::randn(Shape::new(vec![1, 3, 32, 32]), 1.0, &mut rng));
    scope.insert_tensor("W", Tensor::randn(Shape::new(vec![8, 3, 3, 3]), 0.1, &mut rng));
    let y = scope.insert_tensor(
        "Y",
        Tensor::zeros(Shape::new(vec![1, 8, 30, 30]), Precision::F32),
    );

    let operator = build_operator(&desc, &scope).expect("conv2d should bind");
    assert_eq!(operator.op_type(), "conv2d");
    assert_eq!(operator.precision(), Precision::F32);

    operator.run()?;
    let first = y.read().bytes().to_vec();

    // Repeated runs with unchanged inputs must be byte-identical: `run`
    // never re-binds and the kernel is deterministic.
    operator.run()?;
    let second = y.read().bytes().to_vec();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn small_graph_binds_and_computes() -> Result<()> {
    let mut scope = Scope::new();
    scope.insert_tensor(
        "X",
        Tensor::from_vec(Shape::new(vec![1, 1, 2, 2]), vec![1.0, -2.0, 3.0, -4.0])?,
    );
    scope.insert_tensor(
        "B",
        Tensor::from_vec(Shape::new(vec![1, 1, 2, 2]), vec![10.0; 4])?,
    );
    scope.insert_tensor(
        "R",
        Tensor::zeros(Shape::new(vec![1, 1, 2, 2]), Precision::F32),
    );
    let out = scope.insert_tensor(
        "Out",
        Tensor::zeros(Shape::new(vec![1, 1, 2, 2]), Precision::F32),
    );

    let descriptors = vec![
        OpDescriptor::new("relu").with_input("X").with_output("R"),
        OpDescriptor::new("elementwise_add")
            .with_input("R")
            .with_input("B")
            .with_output("Out"),
    ];

    let operators = bind_graph(&descriptors, &scope)?;
    assert_eq!(operators.len(), 2);
    for operator in &operators {
        operator.run()?;
    }

    let guard = out.read();
    assert_eq!(
        guard.as_slice::<f32>().unwrap(),
        &[11.0, 10.0, 13.0, 10.0]
    );
    Ok(())
}

#[test]
fn bind_failure_is_fatal_for_the_node_only() {
    let desc: OpDescriptor = serde_json::from_str(conv_scenario_json()).unwrap();

    // Scope is missing the filter: no operator value may be produced.
    let mut scope = Scope::new();
    scope.insert_tensor(
        "X",
        Tensor::zeros(Shape::new(vec![1, 3, 32, 32]), Precision::F32),
    );
    scope.insert_tensor(
        "Y",
        Tensor::zeros(Shape::new(vec![1, 8, 30, 30]), Precision::F32),
    );

    let err = build_operator(&desc, &scope).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("conv2d"), "message was: {message}");
    assert!(message.contains("Filter"), "message was: {message}");
}
