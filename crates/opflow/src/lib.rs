//! Operator binding and dispatch core for a small NN inference runtime.
//!
//! The pipeline this crate covers: a graph loader produces untyped
//! [`OpDescriptor`] values; for each one the [`registry`] selects the
//! parameter kind registered for its op-type tag; that kind's
//! [`Param::bind`] resolves tensors from the shared [`Scope`] and typed
//! attributes from the descriptor's [`AttributeTable`], validating
//! cross-field invariants; the resulting [`Operator`] owns the bound
//! parameter and exposes the single `run` entry point a scheduler calls.

pub mod graph;
pub mod kernels;
pub mod operator;
pub mod ops;
pub mod registry;
pub mod scope;
pub mod tensor;

pub use graph::{AttrValue, AttributeTable, OpDescriptor};
pub use operator::{ErasedOperator, Kernel, Operator};
pub use ops::{BindError, KernelError, Param};
pub use registry::{bind_graph, build_operator, register_operator};
pub use scope::Scope;
pub use tensor::{Precision, Shape, Tensor, TensorRef};
