//! Ancestor paths used when reporting pruned entries
//!
//! A [`NodePath`] is a persistent stack: `push` links a new frame onto the
//! existing one, so sibling subtrees share their common prefix and never see
//! each other's pushes.

use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct Frame {
    name: Option<String>,
    parent: Option<Rc<Frame>>,
}

#[derive(Debug, Clone)]
pub struct NodePath {
    top: Rc<Frame>,
}

impl NodePath {
    /// Path consisting of the root node only.
    pub fn root(name: Option<&str>) -> Self {
        Self {
            top: Rc::new(Frame {
                name: name.map(str::to_string),
                parent: None,
            }),
        }
    }

    pub fn push(&self, name: Option<&str>) -> Self {
        Self {
            top: Rc::new(Frame {
                name: name.map(str::to_string),
                parent: Some(Rc::clone(&self.top)),
            }),
        }
    }

    /// `path/name`, used for entries directly under the top frame.
    pub fn join(&self, name: &str) -> String {
        format!("{}/{}", self, name)
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(Some(self.top.as_ref()), |frame| frame.parent.as_deref())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self
            .frames()
            .map(|frame| frame.name.as_deref().unwrap_or(""))
            .collect();
        names.reverse();
        f.write_str(&names.join("/"))
    }
}
