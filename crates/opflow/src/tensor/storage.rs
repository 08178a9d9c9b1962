//! Defines the scalar element trait implemented by host-side tensors.

use super::precision::Precision;

/// Trait describing the scalar types a tensor buffer can be viewed as.
///
/// Each implementation pins the [`Precision`] tag its storage layout
/// corresponds to, so typed views are checked against the tensor's runtime
/// precision instead of silently reinterpreting bytes.
pub trait StorageElement: Copy + Default + Send + Sync + 'static {
    /// The precision tag matching this element's storage layout.
    const PRECISION: Precision;
}

impl StorageElement for f32 {
    const PRECISION: Precision = Precision::F32;
}

impl StorageElement for i32 {
    const PRECISION: Precision = Precision::I32;
}
