use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scenecast::{CollectionDef, InMemorySourceRegistry, NodeKind, Scene, SceneGraph, SceneNode};

#[derive(Parser, Debug)]
#[command(name = "scenecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every scene's tree with draw indices and nested-scene references.
    Inspect(InspectArgs),
    /// Load a collection and report structural errors.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input collection JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input collection JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn load_graph(path: &Path) -> anyhow::Result<SceneGraph> {
    let def = CollectionDef::from_path(path)
        .with_context(|| format!("read collection '{}'", path.display()))?;
    let graph = SceneGraph::from_def(def, Box::new(InMemorySourceRegistry::new()))
        .with_context(|| format!("load collection '{}'", path.display()))?;
    Ok(graph)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.in_path)?;
    let nodes: usize = graph.scenes().map(Scene::len).sum();
    eprintln!(
        "ok: {} scene(s), {} node(s), {} source(s)",
        graph.scene_ids().len(),
        nodes,
        graph
            .registry()
            .source_ids()
            .len()
            .saturating_sub(graph.scene_ids().len())
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.in_path)?;
    println!("collection {} ({})", graph.name(), graph.collection_id());
    for scene in graph.scenes() {
        let active = if graph.active_scene_id() == Some(scene.id()) {
            " [active]"
        } else {
            ""
        };
        println!("scene {} ({}){active}", scene.name(), scene.id());
        for slot in scene.draw_order() {
            let depth = scene.parent_chain(&slot.id).len();
            let draw = match slot.draw_index {
                Some(i) => i.to_string(),
                None => "-".to_owned(),
            };
            let label = match (slot.kind, scene.node(&slot.id)) {
                (NodeKind::Folder, Some(SceneNode::Folder(f))) => format!("folder {}", f.name),
                (NodeKind::Item, Some(SceneNode::Item(i))) => {
                    if graph.is_scene_source(&i.source_id) {
                        format!("scene -> {}", i.source_id)
                    } else {
                        let name = graph
                            .source(&i.source_id)
                            .map(|d| d.name)
                            .unwrap_or_else(|| "?".to_owned());
                        format!("item {name} ({})", i.source_id)
                    }
                }
                _ => continue,
            };
            println!("  {:indent$}[{draw}] {label}", "", indent = depth * 2);
        }
    }
    Ok(())
}
