//! Runtime registry for selecting operator constructors by op-type tag.
//!
//! The built-in kinds live in a static factory table; external crates can
//! register additional kinds into the global registry. Resolution happens
//! once per node at graph-build time, so dispatch stays out of the `run`
//! hot path entirely.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::graph::OpDescriptor;
use crate::operator::{ErasedOperator, Kernel, Operator};
use crate::ops::conv::Conv2dKernel;
use crate::ops::elementwise::{ElementwiseAddKernel, ReluKernel};
use crate::ops::pool::Pool2dKernel;
use crate::ops::split::SplitKernel;
use crate::ops::BindError;
use crate::scope::Scope;

/// Signature for operator constructors stored in the registry.
pub type BuildFn = fn(&OpDescriptor, &Scope) -> Result<Box<dyn ErasedOperator>, BindError>;

/// One registrable operator kind.
#[derive(Clone, Copy)]
pub struct OpFactory {
    pub kind: &'static str,
    pub build: BuildFn,
}

/// Generic constructor adapter: binds `K`'s parameter kind and erases the result.
pub fn build_one<K: Kernel>(
    desc: &OpDescriptor,
    scope: &Scope,
) -> Result<Box<dyn ErasedOperator>, BindError> {
    Ok(Box::new(Operator::<K>::create(desc, scope)?))
}

/// Returns the list of built-in operator factories.
///
/// Defined as a function rather than a `static` so the entries can reference
/// the generic `build_one::<K>` instantiations directly.
fn builtin_factories() -> &'static [OpFactory] {
    &[
        OpFactory {
            kind: "conv2d",
            build: build_one::<Conv2dKernel>,
        },
        OpFactory {
            kind: "pool2d",
            build: build_one::<Pool2dKernel>,
        },
        OpFactory {
            kind: "relu",
            build: build_one::<ReluKernel>,
        },
        OpFactory {
            kind: "elementwise_add",
            build: build_one::<ElementwiseAddKernel>,
        },
        OpFactory {
            kind: "split",
            build: build_one::<SplitKernel>,
        },
    ]
}

struct OperatorRegistry {
    factories: RwLock<HashMap<String, BuildFn>>,
}

impl OperatorRegistry {
    fn with_builtins() -> Self {
        let mut factories = HashMap::new();
        for factory in builtin_factories() {
            factories.insert(factory.kind.to_string(), factory.build);
        }
        OperatorRegistry {
            factories: RwLock::new(factories),
        }
    }

    fn get(&self, kind: &str) -> Option<BuildFn> {
        self.factories
            .read()
            .expect("operator registry poisoned")
            .get(kind)
            .copied()
    }

    fn register(&self, kind: String, build: BuildFn) -> bool {
        let mut guard = self.factories.write().expect("operator registry poisoned");
        if guard.contains_key(&kind) {
            return false;
        }
        guard.insert(kind, build);
        true
    }

    fn kinds(&self) -> Vec<String> {
        self.factories
            .read()
            .expect("operator registry poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

static GLOBAL_REGISTRY: OnceLock<OperatorRegistry> = OnceLock::new();

fn global_registry() -> &'static OperatorRegistry {
    GLOBAL_REGISTRY.get_or_init(OperatorRegistry::with_builtins)
}

/// Registers an operator kind under `kind`.
///
/// First registration wins: built-in kinds cannot be displaced, and the
/// return value reports whether the registration took effect.
pub fn register_operator(kind: impl Into<String>, build: BuildFn) -> bool {
    let kind = kind.into();
    let registered = global_registry().register(kind.clone(), build);
    tracing::debug!(kind = %kind, registered, "operator kind registration");
    registered
}

/// Constructs the operator a descriptor names, binding it against `scope`.
pub fn build_operator(
    desc: &OpDescriptor,
    scope: &Scope,
) -> Result<Box<dyn ErasedOperator>, BindError> {
    let build = global_registry()
        .get(desc.op_type())
        .ok_or_else(|| BindError::UnknownOpType {
            op: desc.op_type().to_string(),
        })?;
    tracing::debug!(op_type = desc.op_type(), "constructing operator");
    build(desc, scope)
}

/// Binds a whole descriptor sequence, failing fast on the first bad node.
///
/// This is the graph-build loop: the caller decides whether a failure aborts
/// the model load or skips the node; no partially-bound operator ever
/// appears in the returned sequence.
pub fn bind_graph(
    descriptors: &[OpDescriptor],
    scope: &Scope,
) -> Result<Vec<Box<dyn ErasedOperator>>, BindError> {
    descriptors
        .iter()
        .map(|desc| build_operator(desc, scope))
        .collect()
}

/// Lists every registered op-type tag.
pub fn list_op_types() -> Vec<String> {
    global_registry().kinds()
}

/// Reports whether an op-type tag is registered.
pub fn has_op_type(kind: &str) -> bool {
    global_registry().get(kind).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{Precision, Shape, Tensor};

    #[test]
    fn builtins_are_registered() {
        for kind in ["conv2d", "pool2d", "relu", "elementwise_add", "split"] {
            assert!(has_op_type(kind), "missing builtin '{kind}'");
        }
        assert!(!has_op_type("batch_norm"));
    }

    #[test]
    fn unknown_op_type_is_reported() {
        let scope = Scope::new();
        let desc = OpDescriptor::new("batch_norm");
        let err = build_operator(&desc, &scope).unwrap_err();
        assert!(matches!(err, BindError::UnknownOpType { ref op } if op == "batch_norm"));
    }

    #[test]
    fn builtin_kinds_cannot_be_displaced() {
        assert!(!register_operator("relu", build_one::<Conv2dKernel>));
    }

    #[test]
    fn bind_graph_fails_fast() {
        let mut scope = Scope::new();
        scope.insert_tensor("X", Tensor::zeros(Shape::new(vec![2]), Precision::F32));
        scope.insert_tensor("Out", Tensor::zeros(Shape::new(vec![2]), Precision::F32));
        let good = OpDescriptor::new("relu").with_input("X").with_output("Out");
        let bad = OpDescriptor::new("relu").with_input("missing").with_output("Out");
        let err = bind_graph(&[good, bad], &scope).unwrap_err();
        assert!(matches!(err, BindError::MissingInput { .. }));
    }
}
