//! Graph-facing interchange types produced by the model loader.

mod attribute;
mod descriptor;

pub use attribute::{AttrError, AttrValue, AttributeTable, FromAttr};
pub use descriptor::OpDescriptor;
