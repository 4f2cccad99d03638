//! Integration tests for pruning passes
//!
//! Exercises traversal order, path reporting, renaming and fail-fast
//! behavior on whole trees.

use ksp_version_gate::{
    CheckError, ConfigNode, ConfigSource, EntryKind, GameVersion, LoggingProgress,
    ProgressEvent, RecordingProgress, SourceId, VersionChecker,
};

const RUNNING: GameVersion = GameVersion::new(1, 8, 1);
const URL: &str = "GameData/Squad/Parts/fuelTank.cfg";

fn source() -> SourceId {
    SourceId::new(URL)
}

fn unsatisfied_value(path: &str) -> ProgressEvent {
    ProgressEvent::UnsatisfiedValue {
        source: URL.to_string(),
        path: path.to_string(),
    }
}

fn unsatisfied_node(path: &str) -> ProgressEvent {
    ProgressEvent::UnsatisfiedNode {
        source: URL.to_string(),
        path: path.to_string(),
    }
}

fn sample_part() -> ConfigNode {
    ConfigNode::new("PART")
        .with_value("name", "fuelTank")
        .with_value("mass:KSP_VERSION[<1.0]", "0.5")
        .with_value("mass:KSP_VERSION[>≈1.0]", "0.25")
        .with_node(
            ConfigNode::new("MODULE:KSP_VERSION[1.8]")
                .with_value("name", "ModuleFuelJettison")
                .with_value("legacy:KSP_VERSION[1.3]", "true")
                .with_node(ConfigNode::new("INNER:KSP_VERSION[!1.8.1]")),
        )
        .with_node(
            ConfigNode::new("RESOURCE:KSP_VERSION[2.0]")
                .with_value("broken:KSP_VERSION[", "never visited"),
        )
        .with_node(ConfigNode::new("RESOURCE").with_value("amount:ksp_version[1.8|1.9]", "100"))
}

#[test]
fn test_prune_full_tree() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut part = sample_part();

    checker.prune(&mut part, &source()).unwrap();

    let expected = ConfigNode::new("PART")
        .with_value("name", "fuelTank")
        .with_value("mass", "0.25")
        .with_node(ConfigNode::new("MODULE").with_value("name", "ModuleFuelJettison"))
        .with_node(ConfigNode::new("RESOURCE").with_value("amount", "100"));
    assert_eq!(part, expected);

    // values before nodes, pre-order, original names in reported paths
    assert_eq!(
        progress.events(),
        vec![
            unsatisfied_value("PART/mass:KSP_VERSION[<1.0]"),
            unsatisfied_value("PART/MODULE/legacy:KSP_VERSION[1.3]"),
            unsatisfied_node("PART/MODULE/INNER:KSP_VERSION[!1.8.1]"),
            unsatisfied_node("PART/RESOURCE:KSP_VERSION[2.0]"),
        ]
    );
}

#[test]
fn test_unsatisfied_node_is_not_descended() {
    // The malformed value inside RESOURCE:KSP_VERSION[2.0] would abort the
    // pass if the node were visited.
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut part = sample_part();
    assert!(checker.prune(&mut part, &source()).is_ok());
}

#[test]
fn test_prune_is_idempotent() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut part = sample_part();

    checker.prune(&mut part, &source()).unwrap();
    let once = part.clone();
    progress.take();

    checker.prune(&mut part, &source()).unwrap();
    assert_eq!(part, once);
    assert!(progress.events().is_empty());
}

#[test]
fn test_scenarios_at_1_8_1() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();

    let mut root = ConfigNode::new("ROOT").with_node(ConfigNode::new("SomeNode:KSP_VERSION[1.8]"));
    checker.prune(&mut root, &source()).unwrap();
    assert_eq!(root.node_names(), vec![Some("SomeNode")]);

    let mut root = ConfigNode::new("ROOT").with_node(ConfigNode::new("SomeNode:KSP_VERSION[2.0]"));
    checker.prune(&mut root, &source()).unwrap();
    assert!(root.nodes.is_empty());
    assert_eq!(
        progress.unsatisfied_paths(),
        vec!["ROOT/SomeNode:KSP_VERSION[2.0]"]
    );
}

#[test]
fn test_malformed_node_annotation_aborts_pass() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut root = ConfigNode::new("ROOT")
        .with_node(ConfigNode::new("Gone:KSP_VERSION[2.0]"))
        .with_node(ConfigNode::new("SomeNode:KSP_VERSION[2.0"))
        .with_node(ConfigNode::new("Later:KSP_VERSION[2.0]"));

    let err = checker.prune(&mut root, &source()).unwrap_err();

    match &err {
        CheckError::MalformedAnnotation { kind, name, .. } => {
            assert_eq!(*kind, EntryKind::Node);
            assert_eq!(name, "SomeNode:KSP_VERSION[2.0");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // entries from the failing one onward are left in place
    assert_eq!(
        root.node_names(),
        vec![Some("SomeNode:KSP_VERSION[2.0"), Some("Later:KSP_VERSION[2.0]")]
    );

    let events = progress.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], unsatisfied_node("ROOT/Gone:KSP_VERSION[2.0]"));
    match &events[1] {
        ProgressEvent::Exception { message, error } => {
            assert!(message.contains("node \"SomeNode:KSP_VERSION[2.0\""));
            assert!(error.contains("unclosed"));
        }
        other => panic!("expected exception event, got {other:?}"),
    }
}

#[test]
fn test_malformed_expression_deep_in_tree_aborts_pass() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut root = ConfigNode::new("ROOT").with_node(
        ConfigNode::new("A").with_node(ConfigNode::new("B").with_value("x:KSP_VERSION[1.x]", "1")),
    );

    let err = checker.prune(&mut root, &source()).unwrap_err();
    assert!(matches!(
        err,
        CheckError::MalformedAnnotation {
            kind: EntryKind::Value,
            ..
        }
    ));

    // reported once, where it happened
    let exceptions = progress
        .events()
        .into_iter()
        .filter(|e| matches!(e, ProgressEvent::Exception { .. }))
        .count();
    assert_eq!(exceptions, 1);
}

#[test]
fn test_empty_annotation_body_is_malformed() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut root = ConfigNode::new("ROOT").with_value("x:KSP_VERSION[]", "1");
    assert!(checker.prune(&mut root, &source()).is_err());
}

#[test]
fn test_nameless_node_is_flagged_and_kept() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut root = ConfigNode::new("ROOT").with_node(
        ConfigNode::unnamed().with_value("gone:KSP_VERSION[0.9]", "1"),
    );

    checker.prune(&mut root, &source()).unwrap();

    assert_eq!(root.nodes.len(), 1);
    assert!(root.nodes[0].values.is_empty());
    let events = progress.events();
    assert!(matches!(&events[0], ProgressEvent::Error { message, .. } if message.contains("config.name == null")));
    assert_eq!(events[1], unsatisfied_value("ROOT//gone:KSP_VERSION[0.9]"));
}

#[test]
fn test_duplicate_sibling_names() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut root = ConfigNode::new("ROOT")
        .with_node(ConfigNode::new("MODULE:KSP_VERSION[1.8]").with_value("n", "a"))
        .with_node(ConfigNode::new("MODULE:KSP_VERSION[1.9]").with_value("n", "b"))
        .with_node(ConfigNode::new("MODULE").with_value("n", "c"));

    checker.prune(&mut root, &source()).unwrap();

    let kept: Vec<_> = root.nodes.iter().filter_map(|n| n.get_value("n")).collect();
    assert_eq!(kept, vec!["a", "c"]);
}

#[test]
fn test_prune_source_without_root() {
    let progress = RecordingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut empty = ConfigSource {
        id: source(),
        root: None,
    };
    assert!(matches!(
        checker.prune_source(&mut empty),
        Err(CheckError::InvalidArgument(_))
    ));
    assert!(progress.events().is_empty());

    let mut full = ConfigSource::new(URL, ConfigNode::new("PART").with_value("a:KSP_VERSION[2]", "1"));
    checker.prune_source(&mut full).unwrap();
    assert_eq!(full.root.unwrap().values.len(), 0);
}

#[test]
fn test_logging_progress_totals() {
    let progress = LoggingProgress::new();
    let checker = VersionChecker::new(&progress, RUNNING).unwrap();
    let mut part = sample_part();

    checker.prune(&mut part, &source()).unwrap();

    let counts = progress.counter().snapshot();
    assert_eq!(counts.unsatisfied_values, 2);
    assert_eq!(counts.unsatisfied_nodes, 2);
    assert_eq!(counts.exceptions, 0);
}

#[test]
fn test_independent_trees_across_threads() {
    let progress = LoggingProgress::new();
    let mut trees: Vec<ConfigNode> = (0..4).map(|_| sample_part()).collect();

    std::thread::scope(|scope| {
        for tree in trees.iter_mut() {
            let progress = &progress;
            scope.spawn(move || {
                let checker = VersionChecker::new(progress, RUNNING).unwrap();
                checker.prune(tree, &source()).unwrap();
            });
        }
    });

    assert!(trees.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(progress.counter().snapshot().total_unsatisfied(), 16);
}
