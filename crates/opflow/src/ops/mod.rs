//! Operator parameter contracts and the binding helpers they share.
//!
//! Every operator kind defines a parameter type implementing [`Param`]: a
//! validated snapshot of the tensors and attributes its kernel needs,
//! produced once from a descriptor and a scope. The helpers here keep each
//! kind's `bind` body down to one resolution or check per line, the same
//! shape for every operator.

mod error;

pub mod conv;
pub mod elementwise;
pub mod pool;
pub mod split;

pub use error::{BindError, KernelError};

use crate::graph::{AttrError, FromAttr, OpDescriptor};
use crate::scope::Scope;
use crate::tensor::{Precision, TensorRef};

/// The binding contract every operator-specific parameter type implements.
///
/// `bind` is a pure function of `(descriptor, scope)`: no hidden state,
/// deterministic, safe to retry. It resolves every required role and
/// attribute, validates cross-field invariants, and returns either a fully
/// populated value or the first [`BindError`] encountered.
pub trait Param: Sized + Send + Sync + 'static {
    /// The op-type tag this parameter kind binds.
    fn op_type() -> &'static str;

    /// Resolves and validates a descriptor against a scope.
    fn bind(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError>;

    /// The numeric precision all bound tensors were validated to share.
    fn precision(&self) -> Precision;
}

/// Resolves the ordinary (activation) input at `index`.
pub fn ordinary_input(
    desc: &OpDescriptor,
    scope: &Scope,
    index: usize,
    role: &str,
) -> Result<TensorRef, BindError> {
    let name = desc
        .inputs()
        .get(index)
        .ok_or_else(|| missing_input(desc, role, "?"))?;
    scope
        .lookup(name)
        .map_err(|_| missing_input(desc, role, name))
}

/// Resolves a parameter input (graph-constant tensor such as weights) by role key.
pub fn param_input(desc: &OpDescriptor, scope: &Scope, role: &str) -> Result<TensorRef, BindError> {
    let name = desc
        .para_inputs()
        .get(role)
        .ok_or_else(|| missing_input(desc, role, "?"))?;
    scope
        .lookup(name)
        .map_err(|_| missing_input(desc, role, name))
}

/// Resolves the output at `index`.
pub fn output(
    desc: &OpDescriptor,
    scope: &Scope,
    index: usize,
    role: &str,
) -> Result<TensorRef, BindError> {
    let name = desc
        .outputs()
        .get(index)
        .ok_or_else(|| missing_output(desc, role, "?"))?;
    scope
        .lookup(name)
        .map_err(|_| missing_output(desc, role, name))
}

/// Resolves every declared output, for operators with a variable output count.
pub fn all_outputs(desc: &OpDescriptor, scope: &Scope) -> Result<Vec<TensorRef>, BindError> {
    desc.outputs()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            scope
                .lookup(name)
                .map_err(|_| missing_output(desc, &format!("Out{index}"), name))
        })
        .collect()
}

/// Reads a required attribute as `T`, lifting attribute errors into [`BindError`].
pub fn attr<T: FromAttr>(desc: &OpDescriptor, key: &str) -> Result<T, BindError> {
    desc.attrs().get::<T>(key).map_err(|err| lift_attr(desc, err))
}

/// Reads an optional attribute as `T`, substituting the operator-defined default.
pub fn attr_or<T: FromAttr>(desc: &OpDescriptor, key: &str, default: T) -> Result<T, BindError> {
    desc.attrs()
        .get_or::<T>(key, default)
        .map_err(|err| lift_attr(desc, err))
}

/// Reads an int-list attribute that must hold exactly two non-negative entries.
pub fn int_pair(desc: &OpDescriptor, key: &str) -> Result<[usize; 2], BindError> {
    let values = attr::<Vec<i64>>(desc, key)?;
    if values.len() != 2 {
        return Err(constraint(
            desc,
            key,
            "a list of exactly 2 integers",
            format!("{} entries", values.len()),
        ));
    }
    if values.iter().any(|&v| v < 0) {
        return Err(constraint(
            desc,
            key,
            "non-negative integers",
            format!("{values:?}"),
        ));
    }
    Ok([values[0] as usize, values[1] as usize])
}

/// Like [`int_pair`] but both entries must be strictly positive.
pub fn positive_pair(desc: &OpDescriptor, key: &str) -> Result<[usize; 2], BindError> {
    let pair = int_pair(desc, key)?;
    if pair.contains(&0) {
        return Err(constraint(
            desc,
            key,
            "strictly positive integers",
            format!("{pair:?}"),
        ));
    }
    Ok(pair)
}

/// Validates that every listed tensor shares one precision; returns it.
///
/// The first role is the reference; the first disagreeing role is reported.
pub fn same_precision(
    desc: &OpDescriptor,
    roles: &[(&str, &TensorRef)],
) -> Result<Precision, BindError> {
    let (_, first) = roles
        .first()
        .expect("precision check requires at least one role");
    let expected = first.read().precision();
    for (role, tensor) in &roles[1..] {
        let found = tensor.read().precision();
        if found != expected {
            return Err(BindError::PrecisionMismatch {
                op: desc.op_type().to_string(),
                role: role.to_string(),
                expected,
                found,
            });
        }
    }
    Ok(expected)
}

/// Builds the `TypeMismatch`-class error used for value-constraint violations:
/// the stored tag was right but the value breaks the operator's contract.
pub fn constraint(
    desc: &OpDescriptor,
    key: &str,
    expected: impl Into<String>,
    found: impl Into<String>,
) -> BindError {
    BindError::TypeMismatch {
        op: desc.op_type().to_string(),
        key: key.to_string(),
        expected: expected.into(),
        found: found.into(),
    }
}

fn missing_input(desc: &OpDescriptor, role: &str, name: &str) -> BindError {
    BindError::MissingInput {
        op: desc.op_type().to_string(),
        role: role.to_string(),
        name: name.to_string(),
    }
}

fn missing_output(desc: &OpDescriptor, role: &str, name: &str) -> BindError {
    BindError::MissingOutput {
        op: desc.op_type().to_string(),
        role: role.to_string(),
        name: name.to_string(),
    }
}

fn lift_attr(desc: &OpDescriptor, err: AttrError) -> BindError {
    match err {
        AttrError::Missing { key } => BindError::MissingAttribute {
            op: desc.op_type().to_string(),
            key,
        },
        AttrError::TypeMismatch {
            key,
            expected,
            found,
        } => BindError::TypeMismatch {
            op: desc.op_type().to_string(),
            key,
            expected: expected.to_string(),
            found: found.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{Shape, Tensor};

    fn scope_with(names: &[&str]) -> Scope {
        let mut scope = Scope::new();
        for name in names {
            scope.insert_tensor(*name, Tensor::zeros(Shape::new(vec![1]), Precision::F32));
        }
        scope
    }

    #[test]
    fn resolves_inputs_by_position_and_role() {
        let scope = scope_with(&["a", "b"]);
        let desc = OpDescriptor::new("test").with_input("a").with_input("b");
        assert!(ordinary_input(&desc, &scope, 1, "Y").is_ok());
    }

    #[test]
    fn undeclared_slot_reports_the_role() {
        let scope = scope_with(&[]);
        let desc = OpDescriptor::new("test");
        let err = ordinary_input(&desc, &scope, 0, "Input").unwrap_err();
        assert!(
            matches!(err, BindError::MissingInput { ref role, .. } if role == "Input"),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn unresolvable_name_reports_role_and_name() {
        let scope = scope_with(&[]);
        let desc = OpDescriptor::new("test").with_para_input("Filter", "W");
        let err = param_input(&desc, &scope, "Filter").unwrap_err();
        match err {
            BindError::MissingInput { op, role, name } => {
                assert_eq!(op, "test");
                assert_eq!(role, "Filter");
                assert_eq!(name, "W");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn int_pair_enforces_length_and_sign() {
        let desc = OpDescriptor::new("test")
            .with_attr("three", vec![1i64, 2, 3])
            .with_attr("negative", vec![-1i64, 0])
            .with_attr("ok", vec![0i64, 2]);
        assert!(matches!(
            int_pair(&desc, "three").unwrap_err(),
            BindError::TypeMismatch { .. }
        ));
        assert!(matches!(
            int_pair(&desc, "negative").unwrap_err(),
            BindError::TypeMismatch { .. }
        ));
        assert_eq!(int_pair(&desc, "ok").unwrap(), [0, 2]);
        assert!(positive_pair(&desc, "ok").is_err());
    }

    #[test]
    fn precision_check_names_the_offending_role() {
        let mut scope = Scope::new();
        let x = scope.insert_tensor("x", Tensor::zeros(Shape::new(vec![1]), Precision::F32));
        let w = scope.insert_tensor("w", Tensor::zeros(Shape::new(vec![1]), Precision::I32));
        let desc = OpDescriptor::new("test");
        let err = same_precision(&desc, &[("Input", &x), ("Filter", &w)]).unwrap_err();
        match err {
            BindError::PrecisionMismatch {
                role,
                expected,
                found,
                ..
            } => {
                assert_eq!(role, "Filter");
                assert_eq!(expected, Precision::F32);
                assert_eq!(found, Precision::I32);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
