//! CLI frontend for inspecting and editing Tower Unite condo saves.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use condo_core::Selector;
use glam::DVec3;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::Context;

#[derive(Parser)]
#[command(
    name = "condo",
    about = "Inspect and edit Tower Unite condo saves",
    version,
    propagate_version = true
)]
struct Cli {
    /// Read and write JSON documents directly, skipping the converter
    #[arg(short, long, global = true)]
    json_only: bool,

    /// Path to the suitebro converter (default: $CONDO_CONVERTER, then lib/<platform>/)
    #[arg(long, global = true, value_name = "PATH")]
    converter: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Selector pipeline shared by every command that acts on a subset.
#[derive(Args)]
struct SelectArgs {
    /// Selector expression, e.g. `name:Chair`, `group:3`, `box:0,0,0;100,100,100`.
    /// Repeat to refine the previous result (default: items)
    #[arg(short, long = "select", value_name = "EXPR")]
    selectors: Vec<Selector>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a save: object totals and per-item counts
    Info {
        /// Save file
        path: PathBuf,

        /// Only count items that occupy an inventory slot
        #[arg(long)]
        inventory: bool,
    },

    /// Show the first object matching a name or custom name
    Find {
        /// Save file
        path: PathBuf,

        /// Object name (case-insensitive)
        name: String,
    },

    /// List the objects a selector pipeline picks
    Select {
        /// Save file
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,
    },

    /// Move the selection so its centroid sits at an offset
    Center {
        /// Save file
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Target for the centroid, as x,y,z
        #[arg(long, default_value = "0,0,0", value_parser = parse_vector)]
        offset: DVec3,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rotate the selection by Euler angles in degrees
    Rotate {
        /// Save file
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Rotation as x,y,z degrees, applied about X then Y then Z
        #[arg(short, long, value_parser = parse_vector)]
        rotation: DVec3,

        /// Rotate around the world origin instead of the selection centroid
        #[arg(long)]
        origin: bool,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the group tag from the selection
    Ungroup {
        /// Save file
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the converter on a single file
    Convert {
        /// Input file
        input: PathBuf,

        /// Conversion target
        #[arg(long, value_enum)]
        to: ConvertTarget,

        /// Output file (default: <input>.json, or the input without .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConvertTarget {
    /// Binary save to JSON
    Json,
    /// JSON to binary save
    Save,
}

fn parse_vector(s: &str) -> Result<DVec3, String> {
    condo_core::vector::parse_xyz(s).ok_or_else(|| format!("expected x,y,z but got \"{s}\""))
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "condo=info,condo_core=info".into());

    match std::env::var("CONDO_LOG_FORMAT").as_deref() {
        Ok("json") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let ctx = Context::new(cli.json_only, cli.converter);

    let result = match cli.command {
        Commands::Info { path, inventory } => commands::info::run(&ctx, &path, inventory),
        Commands::Find { path, name } => commands::find::run(&ctx, &path, &name),
        Commands::Select { path, select } => commands::select::run(&ctx, &path, &select.selectors),
        Commands::Center {
            path,
            select,
            offset,
            output,
        } => commands::center::run(&ctx, &path, &select.selectors, offset, output.as_deref()),
        Commands::Rotate {
            path,
            select,
            rotation,
            origin,
            output,
        } => commands::rotate::run(
            &ctx,
            &path,
            &select.selectors,
            rotation,
            !origin,
            output.as_deref(),
        ),
        Commands::Ungroup {
            path,
            select,
            output,
        } => commands::ungroup::run(&ctx, &path, &select.selectors, output.as_deref()),
        Commands::Convert { input, to, output } => {
            let direction = match to {
                ConvertTarget::Json => condo_core::Direction::ToJson,
                ConvertTarget::Save => condo_core::Direction::ToSave,
            };
            commands::convert::run(&ctx, &input, direction, output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
