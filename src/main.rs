mod branch;
mod canvas;
mod colors;
mod config;
mod domain;
mod help;
mod logging;
mod roots;
mod scores;
mod settings;
mod terminal;
mod tree;
mod view;

use clap::{Args, Parser, Subcommand};
use config::{GrowConfig, RenderConfig};
use domain::Domain;
use settings::Settings;
use std::io;
use std::path::PathBuf;
use view::Thickness;

#[derive(Parser)]
#[command(name = "mindroots")]
#[command(author = "Terminal Art Generator")]
#[command(version)]
#[command(about = "Consciousness roots: a branching tree grown from five domain scores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where domain scores come from (overrides the config file)
#[derive(Args)]
struct SourceArgs {
    /// JSON or TOML file mapping domain keys to scores
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Score endpoint, queried as <endpoint>?user_id=<user>
    #[arg(long)]
    endpoint: Option<String>,

    /// User whose scores are fetched from the endpoint
    #[arg(long)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow the roots live in the terminal
    Grow {
        /// Seconds per animation frame
        #[arg(short, long)]
        time: Option<f32>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Base hue of the trunk in degrees
        #[arg(long)]
        hue: Option<f32>,

        /// Starting trunk thickness (1.0-3.0)
        #[arg(long)]
        thickness: Option<f32>,

        /// Directory for PNG snapshots
        #[arg(long)]
        snapshots: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Grow the roots without a terminal and save a PNG
    Render {
        /// Output PNG path
        #[arg(short, long, default_value = "mindroots.png")]
        out: PathBuf,

        /// Image width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "600")]
        height: u32,

        /// Frames to simulate
        #[arg(short, long, default_value = "400")]
        frames: u32,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Base hue of the trunk in degrees
        #[arg(long)]
        hue: Option<f32>,

        /// Starting trunk thickness (1.0-3.0)
        #[arg(long)]
        thickness: Option<f32>,

        /// Meditate this many times before growing
        #[arg(short, long, default_value = "0")]
        meditate: u32,

        /// Grow a domain once the trunk has seeded (repeatable)
        #[arg(short, long)]
        grow: Vec<Domain>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the resolved domain scores as JSON
    Scores {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(matches!(cli.command, Commands::Grow { .. }));
    let settings = Settings::load();

    match cli.command {
        Commands::Grow {
            time,
            seed,
            hue,
            thickness,
            snapshots,
            source,
        } => {
            let config = GrowConfig {
                frame_time: time.unwrap_or(settings.view.frame_ms as f32 / 1000.0),
                seed,
                base_hue: hue.unwrap_or(settings.view.base_hue),
                thickness: Thickness::new(thickness.unwrap_or(settings.view.thickness)),
                source: settings.scores.source(source.scores, source.endpoint, source.user),
                snapshot_dir: snapshots.unwrap_or_else(|| settings.view.snapshot_dir()),
            };
            roots::run_interactive(config)?;
        }
        Commands::Render {
            out,
            width,
            height,
            frames,
            seed,
            hue,
            thickness,
            meditate,
            grow,
            source,
        } => {
            let config = RenderConfig {
                width: width.clamp(16, 8192),
                height: height.clamp(16, 8192),
                frames,
                seed,
                base_hue: hue.unwrap_or(settings.view.base_hue),
                thickness: Thickness::new(thickness.unwrap_or(settings.view.thickness)),
                meditations: meditate,
                grow,
                source: settings.scores.source(source.scores, source.endpoint, source.user),
                out,
            };
            roots::run_render(&config)?;
        }
        Commands::Scores { source } => {
            let scores = settings
                .scores
                .source(source.scores, source.endpoint, source.user)
                .load();
            let json = serde_json::to_string_pretty(&scores.to_map())
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            println!("{}", json);
        }
    }

    Ok(())
}
