use crate::node::ConfigNode;
use std::fmt;

/// Identifies the configuration source (file + root node) a tree came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    url: String,
}

impl SourceId {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Url suitable for display; `<unknown>` when blank.
    pub fn safe_url(&self) -> &str {
        if self.url.trim().is_empty() {
            "<unknown>"
        } else {
            &self.url
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.safe_url())
    }
}

/// A configuration source together with its (possibly missing) root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub id: SourceId,
    pub root: Option<ConfigNode>,
}

impl ConfigSource {
    pub fn new(url: impl Into<String>, root: ConfigNode) -> Self {
        Self {
            id: SourceId::new(url),
            root: Some(root),
        }
    }
}
