//! Patch descriptors handed over by the patch-pass scheduler
//!
//! Only the root-level `:KSP_VERSION[...]` is acted upon here; the rest of
//! the record is carried for the scheduler.

use crate::checker::VersionChecker;
use crate::expr::ExpressionError;
use crate::progress::PatchProgress;
use crate::source::SourceId;
use std::fmt;
use tracing::debug;

/// Operation requested by a patch header's leading symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// No symbol: plain insertion
    Insert,
    /// `@`
    Edit,
    /// `%`
    Replace,
    /// `+` or `$`
    Copy,
    /// `-` or `!`
    Delete,
    /// `|`
    Rename,
    /// `#`
    Paste,
    /// `*`
    Special,
    /// `&`
    Create,
}

impl Command {
    /// Command for a header's first character; anything unrecognized is an
    /// insertion.
    pub fn from_prefix(prefix: char) -> Self {
        match prefix {
            '@' => Command::Edit,
            '%' => Command::Replace,
            '+' | '$' => Command::Copy,
            '-' | '!' => Command::Delete,
            '|' => Command::Rename,
            '#' => Command::Paste,
            '*' => Command::Special,
            '&' => Command::Create,
            _ => Command::Insert,
        }
    }
}

/// Which pass a patch runs in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PassSpecifier {
    Insert,
    First,
    Legacy,
    Before(String),
    For(String),
    After(String),
    Last(String),
    Final,
}

impl fmt::Display for PassSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassSpecifier::Insert => f.write_str(":INSERT"),
            PassSpecifier::First => f.write_str(":FIRST"),
            PassSpecifier::Legacy => f.write_str(":LEGACY"),
            PassSpecifier::Before(m) => write!(f, ":BEFORE[{}]", m),
            PassSpecifier::For(m) => write!(f, ":FOR[{}]", m),
            PassSpecifier::After(m) => write!(f, ":AFTER[{}]", m),
            PassSpecifier::Last(m) => write!(f, ":LAST[{}]", m),
            PassSpecifier::Final => f.write_str(":FINAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoPatch {
    pub source: SourceId,
    pub command: Command,
    pub node_type: String,
    pub node_name: Option<String>,
    /// Body of the header's `:KSP_VERSION[...]`, if present
    pub ksp_version: Option<String>,
    pub needs: Option<String>,
    pub has: Option<String>,
    pub pass: PassSpecifier,
}

impl ProtoPatch {
    pub fn new(
        source: SourceId,
        command: Command,
        node_type: impl Into<String>,
        pass: PassSpecifier,
    ) -> Self {
        Self {
            source,
            command,
            node_type: node_type.into(),
            node_name: None,
            ksp_version: None,
            needs: None,
            has: None,
            pass,
        }
    }

    pub fn with_node_name(mut self, name: impl Into<String>) -> Self {
        self.node_name = Some(name.into());
        self
    }

    pub fn with_ksp_version(mut self, expression: impl Into<String>) -> Self {
        self.ksp_version = Some(expression.into());
        self
    }

    pub fn with_needs(mut self, expression: impl Into<String>) -> Self {
        self.needs = Some(expression.into());
        self
    }

    pub fn with_has(mut self, expression: impl Into<String>) -> Self {
        self.has = Some(expression.into());
        self
    }
}

impl<P: PatchProgress + ?Sized> VersionChecker<'_, P> {
    /// Whether a patch applies to the running version.
    ///
    /// An unsatisfied root is reported once through
    /// `ksp_version_unsatisfied_root`.
    pub fn check_patch(&self, patch: &ProtoPatch) -> Result<bool, ExpressionError> {
        let Some(expression) = patch.ksp_version.as_deref() else {
            return Ok(true);
        };

        if self.check_expression(expression)? {
            return Ok(true);
        }

        debug!(source = %patch.source, node_type = %patch.node_type, "patch root unsatisfied");
        self.progress().ksp_version_unsatisfied_root(&patch.source);
        Ok(false)
    }

    /// Keep only patches that apply to the running version.
    pub fn filter_patches(&self, patches: Vec<ProtoPatch>) -> Result<Vec<ProtoPatch>, ExpressionError> {
        let mut kept = Vec::with_capacity(patches.len());
        for patch in patches {
            if self.check_patch(&patch)? {
                kept.push(patch);
            }
        }
        Ok(kept)
    }
}
