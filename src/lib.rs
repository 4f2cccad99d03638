//! KSP Version Gate: applicability annotations for configuration trees
//!
//! Node and value names may carry a `:KSP_VERSION[expression]` annotation.
//! A pruning pass evaluates every annotation against the running game
//! version, keeps satisfied entries (with the annotation stripped from their
//! name) and removes the rest, reporting each removal to a [`PatchProgress`]
//! sink.
//!
//! # Expressions
//!
//! ```text
//! 1.8          equal, missing components match anything
//! >≈1.4,<1.9   AND groups separated by ',' or '&'
//! 1.8|1.9      OR terms separated by '|'
//! !1.3         negation
//! ```
//!
//! Comparators are `>`, `>≈`, `<`, `<≈` and `≈` (same as none).
//!
//! # Example
//!
//! ```
//! use ksp_version_gate::{ConfigNode, GameVersion, RecordingProgress, SourceId, VersionChecker};
//!
//! let progress = RecordingProgress::new();
//! let checker = VersionChecker::new(&progress, GameVersion::new(1, 8, 1)).unwrap();
//!
//! let mut part = ConfigNode::new("PART")
//!     .with_node(ConfigNode::new("MODULE:KSP_VERSION[1.8]"))
//!     .with_node(ConfigNode::new("RESOURCE:KSP_VERSION[2.0]"));
//!
//! checker.prune(&mut part, &SourceId::new("GameData/Foo/part.cfg")).unwrap();
//!
//! assert_eq!(part.node_names(), vec![Some("MODULE")]);
//! assert_eq!(progress.unsatisfied_paths(), vec!["PART/RESOURCE:KSP_VERSION[2.0]"]);
//! ```

pub mod annotation;
pub mod checker;
pub mod config;
pub mod expr;
pub mod node;
pub mod patch;
pub mod path;
pub mod progress;
pub mod source;
pub mod version;

// Re-exports
pub use annotation::{Annotation, AnnotationError};
pub use checker::{AnnotationFailure, CheckError, EntryKind, NameCheck, VersionChecker};
pub use config::{load_from_path, load_from_str, ConfigError, Settings};
pub use expr::{Comparator, Expression, ExpressionError, Term};
pub use node::{ConfigNode, ConfigValue};
pub use patch::{Command, PassSpecifier, ProtoPatch};
pub use path::NodePath;
pub use progress::{
    CounterSnapshot, LoggingProgress, PatchProgress, ProgressCounter, ProgressEvent,
    RecordingProgress, Tee,
};
pub use source::{ConfigSource, SourceId};
pub use version::{GameVersion, VersionError};
