//! Error taxonomy for operator construction and execution.

use thiserror::Error;

use crate::tensor::Precision;

/// Construction-time binding failure.
///
/// Always recoverable by the graph-build caller, which may skip or report
/// the offending node. Binding is fail-fast: the first violation is
/// returned and no partially-bound parameter object is ever observable.
/// Every message names the op type and the offending role or key so a
/// malformed model can be diagnosed without re-deserializing it.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("no operator kind is registered for op type '{op}'")]
    UnknownOpType { op: String },

    #[error("op '{op}': missing input tensor for role '{role}' (wanted '{name}')")]
    MissingInput {
        op: String,
        role: String,
        name: String,
    },

    #[error("op '{op}': missing output tensor for role '{role}' (wanted '{name}')")]
    MissingOutput {
        op: String,
        role: String,
        name: String,
    },

    #[error("op '{op}': missing required attribute '{key}'")]
    MissingAttribute { op: String, key: String },

    #[error("op '{op}': '{key}' expected {expected}, found {found}")]
    TypeMismatch {
        op: String,
        key: String,
        expected: String,
        found: String,
    },

    #[error("op '{op}': tensor role '{role}' has precision {found}, expected {expected}")]
    PrecisionMismatch {
        op: String,
        role: String,
        expected: Precision,
        found: Precision,
    },
}

/// Execution-time kernel failure, reported to the scheduler.
///
/// Recoverability is scheduler policy; the default treats a kernel failure
/// as fatal to the pass, since output buffers may already be partially
/// overwritten.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("op '{op}': reference kernel does not support precision {precision}")]
    UnsupportedPrecision {
        op: &'static str,
        precision: Precision,
    },

    #[error("op '{op}': {reason}")]
    Compute { op: &'static str, reason: String },
}
