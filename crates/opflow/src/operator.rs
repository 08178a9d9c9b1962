//! The generic operator wrapper and the scheduler-facing erased view.

use crate::graph::OpDescriptor;
use crate::ops::{BindError, KernelError, Param};
use crate::scope::Scope;
use crate::tensor::Precision;

/// A numerical kernel executable against one bound parameter kind.
///
/// Kernels are stateless: all tensor references and attributes live in the
/// parameter, so `compute` can run repeatedly without re-binding.
pub trait Kernel: Default + Send + Sync + 'static {
    /// The parameter kind this kernel consumes.
    type Param: Param;

    /// Executes the kernel, writing into the parameter's output tensor(s) in place.
    fn compute(&self, param: &Self::Param) -> Result<(), KernelError>;
}

/// A bound graph node: exactly one validated parameter plus its kernel.
///
/// Construction either yields a fully bound operator or fails with a
/// [`BindError`]; there is no observable half-initialized state. After
/// construction the operator stays bound for its whole life, and `run` is a
/// repeatable action that never re-binds.
pub struct Operator<K: Kernel> {
    kernel: K,
    param: K::Param,
}

impl<K: Kernel> Operator<K> {
    /// Binds a descriptor against a scope and wraps the result.
    pub fn create(desc: &OpDescriptor, scope: &Scope) -> Result<Self, BindError> {
        let param = K::Param::bind(desc, scope)?;
        Ok(Operator {
            kernel: K::default(),
            param,
        })
    }

    /// Read access to the bound parameter.
    pub fn param(&self) -> &K::Param {
        &self.param
    }

    /// Executes the kernel against the bound parameter.
    pub fn run(&self) -> Result<(), KernelError> {
        tracing::trace!(op = K::Param::op_type(), "running kernel");
        self.kernel.compute(&self.param)
    }
}

/// Object-safe view of an operator, the unit the scheduler sequences.
///
/// Blanket-implemented by every [`Operator`], so the registry can hand out
/// heterogeneous `Box<dyn ErasedOperator>` values.
pub trait ErasedOperator: Send + Sync {
    /// The op-type tag this operator was constructed for.
    fn op_type(&self) -> &'static str;

    /// The precision all of this operator's tensors share.
    fn precision(&self) -> Precision;

    /// The single invocation entry point the scheduler calls.
    fn run(&self) -> Result<(), KernelError>;
}

impl<K: Kernel> ErasedOperator for Operator<K> {
    fn op_type(&self) -> &'static str {
        K::Param::op_type()
    }

    fn precision(&self) -> Precision {
        self.param.precision()
    }

    fn run(&self) -> Result<(), KernelError> {
        Operator::run(self)
    }
}

impl std::fmt::Debug for dyn ErasedOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedOperator")
            .field("op_type", &self.op_type())
            .field("precision", &self.precision())
            .finish()
    }
}
