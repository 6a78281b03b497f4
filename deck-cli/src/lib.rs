//! # Deck Editor CLI
//!
//! Command-line host for the deck editor. Loads a layout, replays gestures
//! through the editor core, renders SVG snapshots and persists sessions.
//!
//! ## Usage
//!
//! ```bash
//! deck-editor show star.json
//! deck-editor drag star.json --resource plate --x 325 --y 263.5 --out moved.json
//! deck-editor render star.json --out deck.svg --width 1600 --height 1000
//! deck-editor save star.json --session bench-1 --data-dir ./sessions
//! ```
//!
//! `DECK_LAYOUT` and `DECK_DATA_DIR` stand in for the layout path and the
//! data directory when those are not given on the command line.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deck_core::store::DEFAULT_SESSION;

/// Command-line arguments for deck-editor.
#[derive(Debug, Clone, Parser)]
#[command(name = "deck-editor")]
#[command(about = "Inspect, edit and render liquid-handler deck layouts")]
#[command(version)]
pub struct CliArgs {
    /// Editor configuration file (JSON)
    #[arg(long, env = "DECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Disable snapping for this run
    #[arg(long, global = true)]
    pub no_snap: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the resource tree with absolute locations
    Show {
        /// Layout file
        #[arg(env = "DECK_LAYOUT")]
        layout: PathBuf,
    },

    /// Drag a resource to an absolute deck position and report the outcome
    Drag {
        /// Layout file
        #[arg(env = "DECK_LAYOUT")]
        layout: PathBuf,

        /// Resource to drag
        #[arg(long)]
        resource: String,

        /// Target x of the resource's origin, in millimetres
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Target y of the resource's origin, in millimetres
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Write the edited layout here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render the layout to an SVG file
    Render {
        /// Layout file
        #[arg(env = "DECK_LAYOUT")]
        layout: PathBuf,

        /// Output SVG path
        #[arg(long)]
        out: PathBuf,

        /// Canvas width in pixels
        #[arg(long, default_value = "1200")]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value = "800")]
        height: u32,
    },

    /// Print the liquid and tip state projection
    State {
        /// Layout file
        #[arg(env = "DECK_LAYOUT")]
        layout: PathBuf,
    },

    /// Store the layout as a session in a data directory
    Save {
        /// Layout file
        #[arg(env = "DECK_LAYOUT")]
        layout: PathBuf,

        /// Session identifier
        #[arg(long, default_value = DEFAULT_SESSION)]
        session: String,

        /// Directory holding session files
        #[arg(long, env = "DECK_DATA_DIR")]
        data_dir: PathBuf,
    },
}

impl Command {
    /// Layout file the command operates on.
    #[must_use]
    pub fn layout(&self) -> &PathBuf {
        match self {
            Self::Show { layout }
            | Self::Drag { layout, .. }
            | Self::Render { layout, .. }
            | Self::State { layout }
            | Self::Save { layout, .. } => layout,
        }
    }
}
