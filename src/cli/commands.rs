use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::board::EXPORT_FILE_NAME;

#[derive(Parser, Debug)]
#[command(name = "notiz")]
#[command(
    version,
    about = "Sticky notes on a canvas, kept locally and mirrored to a backup service"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./notiz.yaml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Persistence policy (offline-first, server-authoritative)
    #[arg(long, global = true)]
    pub policy: Option<String>,

    /// Base URL of the backup service, e.g. http://localhost:7001/api
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Directory for the on-device store
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the blocks on the board
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new block
    Add {
        /// Block title
        #[arg(long)]
        title: Option<String>,

        /// Block text
        #[arg(long)]
        note: Option<String>,

        /// Hex color, random from the palette when omitted
        #[arg(long)]
        color: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit the title, text or color of a block
    Edit {
        /// Block id or unique prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        note: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Drag a block to a new position
    Move {
        /// Block id or unique prefix
        id: String,

        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },

    /// Delete a block
    Delete {
        /// Block id or unique prefix
        id: String,
    },

    /// Replace the board with the default blocks
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Write the board as pretty-printed JSON
    Export {
        /// Target file (backup.json when given without a value); stdout when omitted
        #[arg(
            long,
            short = 'o',
            value_name = "PATH",
            num_args = 0..=1,
            default_missing_value = EXPORT_FILE_NAME
        )]
        output: Option<PathBuf>,
    },

    /// Replace the board with a JSON backup
    Import {
        /// Backup file holding a JSON array of blocks
        path: PathBuf,
    },
}
