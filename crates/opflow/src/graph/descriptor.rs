//! Immutable, deserialized description of one graph node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attribute::{AttrValue, AttributeTable};

/// One node of a loaded graph: op type, tensor name lists, attributes.
///
/// Ordinary `inputs` are positional activation tensors. `para_inputs` maps a
/// role key (e.g. "Filter") to a tensor name for graph-constant parameter
/// tensors such as weights, which the loader keeps separate from
/// activations. The descriptor is immutable once constructed; the binding
/// step only borrows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpDescriptor {
    #[serde(rename = "op")]
    op_type: String,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(rename = "paraInputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    para_inputs: BTreeMap<String, String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "AttributeTable::is_empty")]
    attrs: AttributeTable,
}

impl OpDescriptor {
    /// Starts a descriptor for the given op type.
    pub fn new(op_type: impl Into<String>) -> Self {
        OpDescriptor {
            op_type: op_type.into(),
            inputs: Vec::new(),
            para_inputs: BTreeMap::new(),
            outputs: Vec::new(),
            attrs: AttributeTable::new(),
        }
    }

    /// Appends an ordinary (activation) input tensor name.
    pub fn with_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    /// Records a parameter input under its role key.
    pub fn with_para_input(mut self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.para_inputs.insert(role.into(), name.into());
        self
    }

    /// Appends an output tensor name.
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    /// Records an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key, value);
        self
    }

    /// The op-type tag the registry dispatches on.
    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    /// Ordered ordinary input tensor names.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Parameter inputs keyed by role.
    pub fn para_inputs(&self) -> &BTreeMap<String, String> {
        &self.para_inputs
    }

    /// Ordered output tensor names.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// The node's attribute table.
    pub fn attrs(&self) -> &AttributeTable {
        &self.attrs
    }
}
