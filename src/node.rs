//! Configuration tree nodes
//!
//! Children are identified by position; sibling names may repeat.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    pub name: String,
    pub value: String,
}

impl ConfigValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ConfigValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// A node without a name.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push(ConfigValue::new(name, value));
        self
    }

    pub fn with_node(mut self, node: ConfigNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// First value with the given name.
    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// First child node with the given name.
    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name() == Some(name))
    }

    pub fn value_names(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn node_names(&self) -> Vec<Option<&str>> {
        self.nodes.iter().map(|n| n.name()).collect()
    }
}
