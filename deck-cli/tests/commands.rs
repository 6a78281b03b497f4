//! CLI Command Tests
//!
//! Runs each subcommand against the Hamilton STAR fixture in a scratch
//! directory.

use std::path::PathBuf;

use clap::Parser;
use deck_cli::commands::{self, DragReport};
use deck_cli::CliArgs;
use deck_core::{DeckScene, DragOutcome, LayoutStore};

const STAR_LAYOUT: &str = include_str!("../../deck-core/tests/fixtures/star_layout.json");

struct Workspace {
    dir: tempfile::TempDir,
    layout: PathBuf,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = dir.path().join("star.json");
    std::fs::write(&layout, STAR_LAYOUT).expect("write layout");
    Workspace { dir, layout }
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["deck-editor"];
    argv.extend_from_slice(args);
    commands::run(&CliArgs::try_parse_from(argv).expect("args"))
}

fn snapping_disabled_config(ws: &Workspace) -> PathBuf {
    let path = ws.dir.path().join("editor.json");
    std::fs::write(&path, r#"{"snapping_enabled": false}"#).expect("write config");
    path
}

fn path(p: &std::path::Path) -> &str {
    p.to_str().expect("utf8 path")
}

#[test]
fn test_show_prints_indented_tree() {
    let ws = workspace();
    let output = run(&["show", path(&ws.layout)]).expect("show");

    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 26);
    assert_eq!(lines[0], "deck (HamiltonDeck) at (0.00, 0.00, 0.00)");
    assert!(output.contains("\n      plate (Plate) at (104.00, 71.50, 186.15)"));
}

#[test]
fn test_drag_reports_and_writes_layout() {
    let ws = workspace();
    let out = ws.dir.path().join("moved.json");
    let output = run(&[
        "drag",
        path(&ws.layout),
        "--resource",
        "tips",
        "--x",
        "329",
        "--y",
        "167.5",
        "--out",
        path(&out),
    ])
    .expect("drag");

    let report: serde_json::Value = serde_json::from_str(&output).expect("report json");
    assert_eq!(report["outcome"]["outcome"], "snapped");
    assert_eq!(report["parent"], "tip_car_1");

    let moved = DeckScene::from_json(&std::fs::read_to_string(&out).expect("read")).expect("load");
    let tips = moved.id_of("tips").expect("tips");
    assert_eq!(moved.parent(tips), moved.id_of("tip_car_1"));
}

#[test]
fn test_drag_without_snapping_places_freely() {
    let ws = workspace();
    let config = snapping_disabled_config(&ws);
    let args = CliArgs::try_parse_from([
        "deck-editor",
        "--config",
        path(&config),
        "drag",
        path(&ws.layout),
        "--resource",
        "tips",
        "--x",
        "329",
        "--y",
        "167.5",
    ])
    .expect("args");
    let mut editor =
        commands::load_editor(&ws.layout, commands::editor_config(&args).expect("config"))
            .expect("editor");

    let report: DragReport = commands::drag(&mut editor, "tips", 329.0, 167.5).expect("drag");
    assert!(matches!(report.outcome, DragOutcome::Placed { .. }));
    assert_eq!(report.parent.as_deref(), Some("deck"));
    assert!(report.surface_commands > 0);
}

#[test]
fn test_drag_unknown_resource_fails() {
    let ws = workspace();
    let result = run(&[
        "drag",
        path(&ws.layout),
        "--resource",
        "ghost",
        "--x",
        "0",
        "--y",
        "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_render_writes_svg() {
    let ws = workspace();
    let out = ws.dir.path().join("deck.svg");
    let output = run(&[
        "render",
        path(&ws.layout),
        "--out",
        path(&out),
        "--width",
        "775",
        "--height",
        "653",
    ])
    .expect("render");

    assert!(output.starts_with("Wrote "));
    let svg = std::fs::read_to_string(&out).expect("svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("width=\"775\""));
    assert!(svg.contains("#2B2D42"));
}

#[test]
fn test_state_lists_containers_and_tip_spots() {
    let ws = workspace();
    let output = run(&["state", path(&ws.layout)]).expect("state");
    let state: serde_json::Value = serde_json::from_str(&output).expect("json");
    assert_eq!(state.as_object().map(serde_json::Map::len), Some(11));
    assert!(state["tips_tipspot_0_0"]["tip"].is_null());
}

#[test]
fn test_save_then_reload_session_file() {
    let ws = workspace();
    let data_dir = ws.dir.path().join("sessions");
    std::fs::create_dir_all(&data_dir).expect("mkdir");

    run(&[
        "save",
        path(&ws.layout),
        "--session",
        "bench-1",
        "--data-dir",
        path(&data_dir),
    ])
    .expect("save");

    let store = LayoutStore::with_data_dir(&data_dir).expect("store");
    assert_eq!(
        store.load_all_sessions().expect("load"),
        vec!["bench-1".to_string()]
    );

    // Session documents are accepted wherever a layout is.
    let session_file = data_dir.join("bench-1.json");
    let output = run(&["show", path(&session_file)]).expect("show session");
    assert!(output.starts_with("deck (HamiltonDeck)"));
}

