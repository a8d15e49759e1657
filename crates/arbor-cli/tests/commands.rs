use arbor_bt::{NodeRegistry, Tree};
use arbor_cli::commands;
use arbor_cli::{ArborConfig, RunConfig};
use arbor_core::{ValueType, Vec2};
use arbor_edit::EditorSettings;
use tempfile::TempDir;

fn new_tree(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tree.json");
    commands::new_tree(&path, false).unwrap();
    path
}

#[test]
fn new_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = new_tree(&dir);
    assert!(commands::new_tree(&path, false).is_err());
    assert!(commands::new_tree(&path, true).is_ok());
    assert!(commands::validate(&path).unwrap().starts_with("ok: 1 nodes"));
}

#[test]
fn add_builds_a_runnable_tree() {
    let dir = TempDir::new().unwrap();
    let path = new_tree(&dir);
    let settings = EditorSettings::default();
    let root = commands::load_tree(&path, &NodeRegistry::with_builtins())
        .unwrap()
        .root();

    let seq = commands::add_node(&path, "Sequence", Some(root), Vec2::ZERO, &settings).unwrap();
    commands::add_node(&path, "Log", Some(seq), Vec2::ZERO, &settings).unwrap();
    commands::add_node(&path, "Wait", Some(seq), Vec2::new(10.0, 0.0), &settings).unwrap();
    commands::add_key(&path, "delay", ValueType::Float, Some("0.25")).unwrap();

    let tree: Tree = commands::load_tree(&path, &NodeRegistry::with_builtins()).unwrap();
    assert_eq!(tree.children(seq).len(), 2);
    assert_eq!(tree.blackboard().find("delay").unwrap().read::<f32>(), Some(0.25));

    let shape = commands::inspect(&path).unwrap();
    assert!(shape.contains("Sequence"));
    assert!(shape.contains("    Wait"));
    assert!(shape.contains("delay: float = 0.25"));

    let config = RunConfig {
        ticks: 20,
        ..RunConfig::default()
    };
    let out = commands::run(&path, &config, None, true).unwrap();
    // Wait defaults to one second at 0.1s per tick.
    assert!(out.contains("tick 9: success"), "{out}");
    assert!(!out.contains("tick 10:"));
    assert!(out.contains("node.stop"));
}

#[test]
fn add_rejects_unknown_types_without_touching_the_file() {
    let dir = TempDir::new().unwrap();
    let path = new_tree(&dir);
    let before = std::fs::read_to_string(&path).unwrap();
    assert!(commands::add_node(&path, "Teleport", None, Vec2::ZERO, &EditorSettings::default()).is_err());
    assert!(commands::add_key(&path, "x", ValueType::Int, Some("\"text\"")).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn run_respects_tick_override() {
    let dir = TempDir::new().unwrap();
    let path = new_tree(&dir);
    let config = RunConfig {
        stop_on_settle: false,
        ..RunConfig::default()
    };
    let out = commands::run(&path, &config, Some(3), false).unwrap();
    assert_eq!(out.lines().count(), 3);
    assert!(out.lines().all(|l| l.ends_with("failure")));
}

#[test]
fn validate_rejects_broken_documents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{ "root": "00000000-0000-0000-0000-000000000001", "nodes": [] }"#)
        .unwrap();
    let err = commands::validate(&path).unwrap_err();
    assert!(format!("{err:#}").contains("missing"));
}

#[test]
fn config_loads_from_project_dir() {
    let dir = TempDir::new().unwrap();
    assert_eq!(ArborConfig::load_from_project(dir.path()).unwrap(), ArborConfig::default());

    std::fs::create_dir_all(dir.path().join(".arbor")).unwrap();
    std::fs::write(
        dir.path().join(".arbor/config.yaml"),
        "log_filter: warn\nrun:\n  ticks: 3\neditor:\n  copy_node_values: false\n",
    )
    .unwrap();
    let config = ArborConfig::load_from_project(dir.path()).unwrap();
    assert_eq!(config.log_filter, "warn");
    assert_eq!(config.run.ticks, 3);
    assert_eq!(config.run.dt_seconds, 0.1);
    assert!(!config.editor.copy_node_values);
}
