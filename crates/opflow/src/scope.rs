//! Name-keyed registry of the tensors a graph executes against.

use std::collections::HashMap;

use thiserror::Error;

use crate::tensor::{Tensor, TensorRef};

/// Raised when a descriptor references a tensor name the scope does not hold.
#[derive(Debug, Error)]
#[error("tensor '{name}' is not registered in scope")]
pub struct TensorNotFound {
    pub name: String,
}

/// Process-local mapping from tensor name to tensor storage.
///
/// The storage subsystem populates the scope before graph construction;
/// during an inference pass the binding layer only reads from it. Every
/// name referenced by a descriptor must resolve here or binding fails.
#[derive(Debug, Default)]
pub struct Scope {
    tensors: HashMap<String, TensorRef>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Scope::default()
    }

    /// Registers a tensor handle under `name`, returning any displaced handle.
    pub fn insert(&mut self, name: impl Into<String>, tensor: TensorRef) -> Option<TensorRef> {
        self.tensors.insert(name.into(), tensor)
    }

    /// Registers an owned tensor under `name` and returns the handle created for it.
    pub fn insert_tensor(&mut self, name: impl Into<String>, tensor: Tensor) -> TensorRef {
        let handle = TensorRef::new(tensor);
        self.insert(name, handle.clone());
        handle
    }

    /// Resolves `name` to a tensor handle.
    pub fn lookup(&self, name: &str) -> Result<TensorRef, TensorNotFound> {
        self.tensors.get(name).cloned().ok_or_else(|| TensorNotFound {
            name: name.to_string(),
        })
    }

    /// Reports whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    /// Returns the number of registered tensors.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Reports whether the scope holds no tensors.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
