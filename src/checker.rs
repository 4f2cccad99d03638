//! Version checker - evaluates `:KSP_VERSION[...]` annotations and prunes trees
//!
//! A pruning pass walks a tree depth-first, values before child nodes, each
//! in original order:
//! - entries without an annotation are left alone
//! - satisfied entries are kept and renamed with the annotation stripped
//! - unsatisfied entries are removed (nodes before being descended into) and
//!   reported to the [`PatchProgress`] sink
//! - a malformed annotation is reported and then aborts the whole pass

use crate::annotation::{self, AnnotationError};
use crate::expr::{Expression, ExpressionError, Term};
use crate::node::{ConfigNode, ConfigValue};
use crate::path::NodePath;
use crate::progress::PatchProgress;
use crate::source::{ConfigSource, SourceId};
use crate::version::GameVersion;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Which kind of tree entry carried an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Value,
    Node,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Value => f.write_str("value"),
            EntryKind::Node => f.write_str("node"),
        }
    }
}

/// Why an annotation could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationFailure {
    #[error(transparent)]
    Syntax(#[from] AnnotationError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("malformed version expression: {0}")]
    MalformedExpression(#[from] ExpressionError),

    #[error("malformed :KSP_VERSION annotation on {kind} \"{name}\": {source}")]
    MalformedAnnotation {
        kind: EntryKind,
        name: String,
        #[source]
        source: AnnotationFailure,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Outcome of checking one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCheck {
    /// No annotation; vacuously satisfied
    Unannotated,
    /// Annotation satisfied; carries the stripped name
    Satisfied(String),
    Unsatisfied,
}

impl NameCheck {
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, NameCheck::Unsatisfied)
    }
}

pub struct VersionChecker<'p, P: PatchProgress + ?Sized> {
    progress: &'p P,
    version: GameVersion,
}

impl<'p, P: PatchProgress + ?Sized> VersionChecker<'p, P> {
    /// `version` is the running game version and must be fully specified.
    pub fn new(progress: &'p P, version: GameVersion) -> Result<Self, CheckError> {
        if !version.is_complete() {
            return Err(CheckError::InvalidArgument(format!(
                "running version {} must have major, minor and revision",
                version
            )));
        }
        Ok(Self { progress, version })
    }

    pub fn version(&self) -> GameVersion {
        self.version
    }

    pub(crate) fn progress(&self) -> &'p P {
        self.progress
    }

    /// Match the running version against a single term such as `>≈1.8`.
    pub fn check_version(&self, term: &str) -> Result<bool, ExpressionError> {
        Ok(Term::parse(term)?.matches(&self.version))
    }

    /// Evaluate a full expression such as `1.8,!0.9`.
    pub fn check_expression(&self, expression: &str) -> Result<bool, ExpressionError> {
        Ok(Expression::parse(expression)?.evaluate(&self.version))
    }

    /// Check the annotation embedded in `name`, if any.
    pub fn check_name(&self, name: &str) -> Result<NameCheck, AnnotationFailure> {
        let Some(found) = annotation::extract(name)? else {
            return Ok(NameCheck::Unannotated);
        };

        if self.check_expression(found.expression)? {
            Ok(NameCheck::Satisfied(found.stripped))
        } else {
            Ok(NameCheck::Unsatisfied)
        }
    }

    /// Prune the tree rooted at `root` in place.
    ///
    /// The root's own name is not checked; it only heads reported paths.
    pub fn prune(&self, root: &mut ConfigNode, source: &SourceId) -> Result<(), CheckError> {
        debug!(source = %source, version = %self.version, "checking :KSP_VERSION annotations");
        let path = NodePath::root(root.name());
        self.prune_node(root, &path, source)
    }

    /// Prune the root held by `source`; fails if it has none.
    pub fn prune_source(&self, source: &mut ConfigSource) -> Result<(), CheckError> {
        let ConfigSource { id, root } = source;
        let Some(root) = root.as_mut() else {
            return Err(CheckError::InvalidArgument(format!(
                "configuration source {} has no root node",
                id
            )));
        };
        self.prune(root, id)
    }

    fn prune_node(
        &self,
        node: &mut ConfigNode,
        path: &NodePath,
        source: &SourceId,
    ) -> Result<(), CheckError> {
        try_retain(&mut node.values, |value| self.keep_value(value, path, source))?;
        try_retain(&mut node.nodes, |child| self.keep_node(child, path, source))
    }

    fn keep_value(
        &self,
        value: &mut ConfigValue,
        path: &NodePath,
        source: &SourceId,
    ) -> Result<bool, CheckError> {
        let check = self
            .check_name(&value.name)
            .map_err(|failure| self.fail(EntryKind::Value, &value.name, failure))?;

        match check {
            NameCheck::Unannotated => Ok(true),
            NameCheck::Satisfied(stripped) => {
                debug!(from = %value.name, to = %stripped, "stripped value annotation");
                value.name = stripped;
                Ok(true)
            }
            NameCheck::Unsatisfied => {
                self.progress
                    .ksp_version_unsatisfied_value(source, &path.join(&value.name));
                Ok(false)
            }
        }
    }

    fn keep_node(
        &self,
        child: &mut ConfigNode,
        path: &NodePath,
        source: &SourceId,
    ) -> Result<bool, CheckError> {
        let check = match child.name.as_deref() {
            Some(name) => self
                .check_name(name)
                .map_err(|failure| self.fail(EntryKind::Node, name, failure))?,
            None => {
                self.progress.error(
                    source,
                    &format!(
                        "Error - Node in file {} subnode: {} has config.name == null",
                        source.safe_url(),
                        path
                    ),
                );
                NameCheck::Unannotated
            }
        };

        match check {
            NameCheck::Unannotated => {}
            NameCheck::Satisfied(stripped) => {
                debug!(to = %stripped, "stripped node annotation");
                child.name = Some(stripped);
            }
            NameCheck::Unsatisfied => {
                let name = child.name.as_deref().unwrap_or_default();
                self.progress
                    .ksp_version_unsatisfied_node(source, &path.join(name));
                return Ok(false);
            }
        }

        let child_path = path.push(child.name());
        self.prune_node(child, &child_path, source)?;
        Ok(true)
    }

    /// Report a malformed annotation, then hand back the error to propagate.
    fn fail(&self, kind: EntryKind, name: &str, failure: AnnotationFailure) -> CheckError {
        let err = CheckError::MalformedAnnotation {
            kind,
            name: name.to_string(),
            source: failure,
        };
        self.progress.exception(
            &format!("Exception while checking :KSP_VERSION for {} \"{}\"", kind, name),
            &err,
        );
        err
    }
}

/// Keep the items for which `keep` returns `Ok(true)`, preserving order.
///
/// On error the failing item and everything after it are put back untouched.
fn try_retain<T, E>(
    items: &mut Vec<T>,
    mut keep: impl FnMut(&mut T) -> Result<bool, E>,
) -> Result<(), E> {
    let mut kept = Vec::with_capacity(items.len());
    let mut pending = std::mem::take(items).into_iter();

    while let Some(mut item) = pending.next() {
        match keep(&mut item) {
            Ok(true) => kept.push(item),
            Ok(false) => {}
            Err(err) => {
                kept.push(item);
                kept.extend(pending);
                *items = kept;
                return Err(err);
            }
        }
    }

    *items = kept;
    Ok(())
}
