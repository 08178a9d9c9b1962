//! Host-backed tensor storage referenced by bound operator parameters.

use std::mem::{size_of, ManuallyDrop};

use rand::Rng;
use thiserror::Error;

use super::precision::Precision;
use super::shape::Shape;
use super::storage::StorageElement;

/// Raised when a constructor is handed a payload that disagrees with the shape.
#[derive(Debug, Error)]
#[error("tensor data length ({len}) does not match shape {dims:?}")]
pub struct LengthMismatch {
    len: usize,
    dims: Vec<usize>,
}

/// Dense n-dimensional array with a fixed precision and an owned buffer.
///
/// The buffer invariant `data.len() == num_elements * element size` is
/// established by every constructor and never broken afterwards; `reshape`
/// style mutation is deliberately absent.
#[derive(Debug, Clone)]
pub struct Tensor {
    shape: Shape,
    precision: Precision,
    data: Vec<u8>,
}

impl Tensor {
    /// Constructs an `F32` tensor from raw values, validating the length against the shape.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, LengthMismatch> {
        if data.len() != shape.num_elements() {
            return Err(LengthMismatch {
                len: data.len(),
                dims: shape.dims().to_vec(),
            });
        }
        Ok(Tensor {
            shape,
            precision: Precision::F32,
            data: vec_into_bytes(data),
        })
    }

    /// Constructs an `I32` tensor, ensuring the payload matches the expected element count.
    pub fn from_i32(shape: Shape, data: Vec<i32>) -> Result<Self, LengthMismatch> {
        if data.len() != shape.num_elements() {
            return Err(LengthMismatch {
                len: data.len(),
                dims: shape.dims().to_vec(),
            });
        }
        Ok(Tensor {
            shape,
            precision: Precision::I32,
            data: vec_into_bytes(data),
        })
    }

    /// Returns a zero-initialized tensor of the requested shape and precision.
    pub fn zeros(shape: Shape, precision: Precision) -> Self {
        let len = shape.num_elements();
        let data = match precision {
            Precision::F32 => vec_into_bytes(vec![0.0f32; len]),
            Precision::I32 => vec_into_bytes(vec![0i32; len]),
            // Half-width payloads are stored as raw u16 words; typed views
            // exist only for the `StorageElement` impls.
            Precision::F16 | Precision::BF16 => vec_into_bytes(vec![0u16; len]),
        };
        Tensor {
            shape,
            precision,
            data,
        }
    }

    /// Samples an `F32` tensor from `N(0, std^2)` using the Box-Muller transform.
    pub fn randn(shape: Shape, std: f32, rng: &mut impl Rng) -> Self {
        let len = shape.num_elements();
        let mut values = Vec::with_capacity(len);
        while values.len() < len {
            let u1: f32 = rng.gen::<f32>().max(f32::MIN_POSITIVE);
            let u2: f32 = rng.gen::<f32>();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            values.push(r * theta.cos() * std);
            if values.len() < len {
                values.push(r * theta.sin() * std);
            }
        }
        Tensor {
            shape,
            precision: Precision::F32,
            data: vec_into_bytes(values),
        }
    }

    /// Provides access to the tensor shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the precision tag of the tensor payload.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Returns the total number of elements stored in the tensor.
    pub fn len(&self) -> usize {
        self.shape.num_elements()
    }

    /// Reports whether the tensor contains zero elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the raw byte payload.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrows the payload as a typed slice, or `None` when the precision differs.
    pub fn as_slice<E: StorageElement>(&self) -> Option<&[E]> {
        if self.precision != E::PRECISION {
            return None;
        }
        Some(bytes_as_slice::<E>(&self.data))
    }

    /// Mutably borrows the payload as a typed slice, or `None` on precision mismatch.
    pub fn as_mut_slice<E: StorageElement>(&mut self) -> Option<&mut [E]> {
        if self.precision != E::PRECISION {
            return None;
        }
        Some(bytes_as_slice_mut::<E>(&mut self.data))
    }

    /// Overwrites every `F32` element with a constant, leaving other precisions untouched.
    pub fn fill(&mut self, value: f32) {
        if let Some(data) = self.as_mut_slice::<f32>() {
            data.fill(value);
        }
    }
}

/// Converts an owned vector into a raw byte buffer without copying.
fn vec_into_bytes<T>(data: Vec<T>) -> Vec<u8> {
    let mut data = ManuallyDrop::new(data);
    let ptr = data.as_mut_ptr() as *mut u8;
    let len = data.len() * size_of::<T>();
    let cap = data.capacity() * size_of::<T>();
    unsafe { Vec::from_raw_parts(ptr, len, cap) }
}

/// Views a byte slice as a typed slice, asserting that the layout matches.
fn bytes_as_slice<T>(bytes: &[u8]) -> &[T] {
    assert_eq!(
        bytes.len() % size_of::<T>(),
        0,
        "byte length {} is not a multiple of element size {}",
        bytes.len(),
        size_of::<T>()
    );
    unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const T, bytes.len() / size_of::<T>()) }
}

/// Views a mutable byte slice as a typed mutable slice, asserting the layout.
fn bytes_as_slice_mut<T>(bytes: &mut [u8]) -> &mut [T] {
    assert_eq!(
        bytes.len() % size_of::<T>(),
        0,
        "byte length {} is not a multiple of element size {}",
        bytes.len(),
        size_of::<T>()
    );
    unsafe {
        std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut T, bytes.len() / size_of::<T>())
    }
}
