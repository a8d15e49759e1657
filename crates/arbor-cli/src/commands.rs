//! Command implementations. Each returns the text the binary prints.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use arbor_bt::{Node, NodeRegistry, Tree, TreeDocument};
use arbor_core::{Context, KeyId, NodeId, Status, TickContext, Value, ValueType, Vec2};
use arbor_edit::{EditorSettings, TreeEditor};
use arbor_tools::TraceLog;
use tracing::info;

use crate::config::RunConfig;

pub fn load_tree(path: &Path, registry: &NodeRegistry) -> Result<Tree> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree from {}", path.display()))?;
    let document = TreeDocument::from_json(&content)
        .with_context(|| format!("Failed to parse tree from {}", path.display()))?;
    Tree::from_document(&document, registry)
        .with_context(|| format!("Invalid tree in {}", path.display()))
}

pub fn save_tree(path: &Path, tree: &Tree) -> Result<()> {
    let json = tree.to_document()?.to_json_pretty()?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write tree to {}", path.display()))
}

/// `arbor new`: write a tree holding only its root.
pub fn new_tree(path: &Path, force: bool) -> Result<String> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let tree = Tree::new();
    save_tree(path, &tree)?;
    info!(path = %path.display(), "tree created");
    Ok(format!("created {} (root {})", path.display(), tree.root()))
}

/// `arbor validate`: load and check every structural invariant.
pub fn validate(path: &Path) -> Result<String> {
    let tree = load_tree(path, &NodeRegistry::with_builtins())?;
    let mut out = format!(
        "ok: {} nodes, {} keys",
        tree.node_count(),
        tree.blackboard().len()
    );
    let orphans = tree.orphans();
    if !orphans.is_empty() {
        let _ = write!(out, ", {} unreachable", orphans.len());
    }
    Ok(out)
}

/// `arbor inspect`: render the tree from the root, then orphans and blackboard keys.
pub fn inspect(path: &Path) -> Result<String> {
    let tree = load_tree(path, &NodeRegistry::with_builtins())?;
    let mut out = String::new();
    render(&tree, tree.root(), 0, &mut out);

    let orphans = tree.orphans();
    if !orphans.is_empty() {
        out.push_str("unreachable:\n");
        for id in orphans {
            render(&tree, id, 1, &mut out);
        }
    }

    if !tree.blackboard().is_empty() {
        out.push_str("blackboard:\n");
        for key in tree.blackboard().keys() {
            let _ = writeln!(out, "  {}: {} = {}", key.name(), key.value_type(), key.value());
        }
    }
    Ok(out)
}

fn render(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let _ = write!(out, "{:indent$}{} {}", "", node.type_name(), node.id(), indent = depth * 2);
    if !node.description().is_empty() {
        let _ = write!(out, " \"{}\"", node.description());
    }
    let fields = describe_fields(tree, node);
    if !fields.is_empty() {
        let _ = write!(out, " [{fields}]");
    }
    out.push('\n');
    for child in node.children() {
        render(tree, *child, depth + 1, out);
    }
}

fn describe_fields(tree: &Tree, node: &Node) -> String {
    let Some(behavior) = node.behavior() else {
        return String::new();
    };
    behavior
        .properties()
        .into_iter()
        .map(|(name, slot)| {
            let bound = slot
                .key()
                .and_then(|id| tree.blackboard().get(id))
                .map(|key| format!(" @{}", key.name()))
                .unwrap_or_default();
            format!("{name}={}{bound}", slot.default_value())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `arbor run`: bind the tree, tick it and report each tick's root status.
pub fn run(path: &Path, config: &RunConfig, ticks: Option<u64>, trace: bool) -> Result<String> {
    let registry = NodeRegistry::with_builtins();
    let mut tree = load_tree(path, &registry)?.instantiate(&registry)?;
    tree.bind(Context::new().with(TraceLog::default()));

    let ticks = ticks.unwrap_or(config.ticks);
    let mut clock = TickContext::new(0, config.dt_seconds);
    let mut out = String::new();
    for _ in 0..ticks {
        let status = tree.tick(clock);
        let _ = writeln!(out, "tick {}: {status}", clock.tick);
        if config.stop_on_settle && status != Status::Running {
            break;
        }
        clock = clock.next();
    }

    if trace {
        if let Some(log) = tree.context().get::<TraceLog>() {
            out.push_str("trace:\n");
            for event in &log.events {
                let node = event
                    .node
                    .and_then(|id| tree.node(id))
                    .map(|n| format!("{} {}", n.type_name(), n.id()))
                    .unwrap_or_default();
                let _ = writeln!(out, "  {} {} {node}", event.tick, event.tag);
            }
        }
    }
    Ok(out)
}

/// `arbor add`: create a registered node, optionally linked under `parent`.
pub fn add_node(
    path: &Path,
    type_name: &str,
    parent: Option<NodeId>,
    position: Vec2,
    settings: &EditorSettings,
) -> Result<NodeId> {
    let registry = NodeRegistry::with_builtins();
    let tree = load_tree(path, &registry)?;
    let mut editor = TreeEditor::new(tree, registry).with_settings(settings.clone());

    let id = {
        let mut batch = editor.begin_batch()?;
        let id = batch.create_node(type_name, position)?;
        if let Some(parent) = parent {
            batch.add_child(parent, id)?;
        }
        batch.commit();
        id
    };
    save_tree(path, editor.tree())?;
    Ok(id)
}

/// `arbor key`: add a blackboard key, optionally with an initial value given as JSON.
pub fn add_key(
    path: &Path,
    name: &str,
    value_type: ValueType,
    value: Option<&str>,
) -> Result<KeyId> {
    let registry = NodeRegistry::with_builtins();
    let tree = load_tree(path, &registry)?;
    let mut editor = TreeEditor::new(tree, registry);

    let id = editor.create_blackboard_key(name, value_type)?;
    if let Some(raw) = value {
        let json: serde_json::Value = serde_json::from_str(raw)
            .with_context(|| format!("Value '{raw}' is not valid JSON"))?;
        let value: Value = serde_json::from_value(serde_json::json!({
            "type": value_type.name(),
            "value": json,
        }))
        .with_context(|| format!("Value '{raw}' is not a {value_type}"))?;
        editor.set_blackboard_value(name, value)?;
    }
    save_tree(path, editor.tree())?;
    Ok(id)
}
