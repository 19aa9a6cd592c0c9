use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use plano::{Floorplan, ManualFrames, Point, RenderAdapter};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod draw;
mod script;
mod venue;

use venue::KdlVenue;

/// Render a court floorplan and replay drag interactions against it.
#[derive(Debug, Parser)]
#[command(name = "courtnex-viewer", version)]
struct Args {
    /// Venue description (KDL).
    venue: PathBuf,

    /// Complex to show. Defaults to the first one in the venue file.
    #[arg(short, long)]
    container: Option<String>,

    /// Interaction script (KDL) replayed before rendering.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Where to write the rendered SVG.
    #[arg(short, long, default_value = "floorplan.svg")]
    output: PathBuf,

    /// Print the scene as JSON instead of writing SVG.
    #[arg(long)]
    json: bool,

    /// Print emitted events as JSON lines.
    #[arg(long)]
    events: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let venue = KdlVenue::open(&args.venue)?;
    let config = venue.config()?;
    let container = match args.container {
        Some(container) => container,
        None => venue
            .complexes()
            .first()
            .map(|c| c.to_string())
            .ok_or_else(|| anyhow!("{} has no complex", args.venue.display()))?,
    };

    let mut plan = Floorplan::new(config, venue, ManualFrames::new())?;
    let count = plan.refresh(&container)?;
    plan.mount(Point::ORIGIN);
    info!(%container, count, "floorplan loaded");

    let mut adapter = RenderAdapter::default();
    if let Some(path) = &args.script {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let actions = script::parse_script(&content)
            .with_context(|| format!("in script {}", path.display()))?;
        let events = script::run(&mut plan, &mut adapter, &actions)?;
        info!(actions = actions.len(), events = events.len(), "script finished");
        if args.events {
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }

    let scene = adapter.render(&plan);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&scene)?);
        return Ok(());
    }
    svg::save(&args.output, &draw::render_svg(&scene))
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(output = %args.output.display(), "floorplan written");
    Ok(())
}
