//! Subcommand implementations.
//!
//! Every command returns the text to print so that the binary stays a thin
//! shell around this module.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use deck_core::{
    Coordinate, DeckEditor, DeckScene, DragOutcome, EditorConfig, LayoutDocument, LayoutStore,
    RecordingSurface, ResourceId,
};
use deck_renderer::{BackendType, EditorView, Renderer, RendererConfig};
use serde::Serialize;

use crate::{CliArgs, Command};

/// Result of a replayed drag.
#[derive(Debug, Clone, Serialize)]
pub struct DragReport {
    /// Dragged resource.
    pub resource: String,
    /// How the gesture ended.
    pub outcome: DragOutcome,
    /// Name of the resource's parent afterwards.
    pub parent: Option<String>,
    /// Absolute location afterwards.
    pub absolute: Option<Coordinate>,
    /// Number of surface calls the gesture produced.
    pub surface_commands: usize,
}

/// Build the editor configuration: file, then environment, then flags.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read.
pub fn editor_config(args: &CliArgs) -> Result<EditorConfig> {
    let config = match &args.config {
        Some(path) => EditorConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if args.no_snap {
        config.snapping_enabled = false;
    }
    Ok(config)
}

/// Load a layout file, or a saved session document, into an editor.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a layout.
pub fn load_editor(path: &Path, config: EditorConfig) -> Result<DeckEditor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading layout {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let scene = if value.get("layout").is_some() {
        let document: LayoutDocument = serde_json::from_value(value)
            .with_context(|| format!("reading session document {}", path.display()))?;
        tracing::debug!("Loaded session {} from {}", document.session_id, path.display());
        document.to_scene()?
    } else {
        DeckScene::from_json(&text)?
    };
    tracing::info!("Loaded {} resources from {}", scene.len(), path.display());
    Ok(DeckEditor::new(scene, config))
}

/// Run a parsed command line.
///
/// # Errors
///
/// Returns an error if loading, editing, rendering or writing fails.
pub fn run(args: &CliArgs) -> Result<String> {
    let config = editor_config(args)?;
    let mut editor = load_editor(args.command.layout(), config)?;

    match &args.command {
        Command::Show { .. } => Ok(show(editor.scene())),
        Command::Drag {
            resource, x, y, out, ..
        } => {
            let report = drag(&mut editor, resource, *x, *y)?;
            if let Some(out) = out {
                write_file(out, &editor.scene().to_json()?)?;
            }
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Command::Render {
            out, width, height, ..
        } => {
            let svg = render_svg(&editor, *width, *height)?;
            write_file(out, &svg)?;
            Ok(format!("Wrote {} ({} bytes)", out.display(), svg.len()))
        }
        Command::State { .. } => Ok(serde_json::to_string_pretty(
            &editor.scene().serialize_state(),
        )?),
        Command::Save {
            session, data_dir, ..
        } => {
            let store = LayoutStore::with_data_dir(data_dir)?;
            let document = store.save(session, editor.scene())?;
            Ok(format!(
                "Saved session {} to {} at {}",
                document.session_id,
                data_dir.display(),
                document.timestamp
            ))
        }
    }
}

/// Indented tree of `name (Type) at (x, y, z)` lines, absolute positions.
#[must_use]
pub fn show(scene: &DeckScene) -> String {
    let mut out = String::new();
    if let Some(root) = scene.root() {
        show_node(scene, root, 0, &mut out);
    }
    out
}

fn show_node(scene: &DeckScene, id: ResourceId, depth: usize, out: &mut String) {
    let (Some(resource), Some(abs)) = (scene.get(id), scene.absolute_location(id)) else {
        return;
    };
    let _ = writeln!(
        out,
        "{:indent$}{} at ({:.2}, {:.2}, {:.2})",
        "",
        resource.tooltip_label(),
        abs.x,
        abs.y,
        abs.z,
        indent = depth * 2
    );
    for &child in resource.children() {
        show_node(scene, child, depth + 1, out);
    }
}

/// Replay a drag of `resource` to the absolute position `(x, y)`.
///
/// # Errors
///
/// Returns an error if the resource is unknown or cannot be dragged.
pub fn drag(editor: &mut DeckEditor, resource: &str, x: f64, y: f64) -> Result<DragReport> {
    let mut surface = RecordingSurface::new();
    let outcome = editor
        .drag_to(resource, x, y, &mut surface)
        .with_context(|| format!("dragging {resource}"))?;

    let scene = editor.scene();
    let id = scene.id_of(resource);
    let parent = id
        .and_then(|id| scene.parent(id))
        .and_then(|p| scene.get(p))
        .map(|p| p.name.clone());
    let absolute = id.and_then(|id| scene.absolute_location(id));
    tracing::info!("Drag of {resource} ended with {outcome:?}");

    Ok(DragReport {
        resource: resource.to_string(),
        outcome,
        parent,
        absolute,
        surface_commands: surface.commands().len(),
    })
}

/// Render the editor's scene to an SVG document.
///
/// # Errors
///
/// Returns an error if the canvas size is unusable or the scene has no deck.
pub fn render_svg(editor: &DeckEditor, width: u32, height: u32) -> Result<String> {
    let mut renderer = Renderer::new(RendererConfig {
        preferred_backend: BackendType::Svg,
        canvas_width: width,
        canvas_height: height,
        ..RendererConfig::default()
    })?;
    let mut view = EditorView::new(editor.config().trash_zone);
    let list = renderer.render(editor.scene(), &mut view)?;
    tracing::debug!("Rendered {} draw commands", list.len());
    Ok(renderer.snapshot()?.to_string())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
