//! Tensor storage types shared between the scope and bound parameters.

mod host_tensor;
mod precision;
mod shape;
mod storage;

pub use host_tensor::{LengthMismatch, Tensor};
pub use precision::Precision;
pub use shape::Shape;
pub use storage::StorageElement;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to a tensor registered in a [`crate::scope::Scope`].
///
/// The scope holds the registering handle; bound parameters hold clones.
/// The per-tensor lock realizes the pass-time discipline: any number of
/// concurrent readers, one writer per output tensor.
#[derive(Debug, Clone)]
pub struct TensorRef(Arc<RwLock<Tensor>>);

impl TensorRef {
    /// Wraps a tensor in a shareable handle.
    pub fn new(tensor: Tensor) -> Self {
        TensorRef(Arc::new(RwLock::new(tensor)))
    }

    /// Acquires a shared read guard over the tensor.
    pub fn read(&self) -> RwLockReadGuard<'_, Tensor> {
        self.0.read().expect("tensor lock poisoned")
    }

    /// Acquires an exclusive write guard over the tensor.
    pub fn write(&self) -> RwLockWriteGuard<'_, Tensor> {
        self.0.write().expect("tensor lock poisoned")
    }

    /// Reports whether two handles refer to the same underlying tensor.
    pub fn ptr_eq(&self, other: &TensorRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Tensor> for TensorRef {
    fn from(tensor: Tensor) -> Self {
        TensorRef::new(tensor)
    }
}
