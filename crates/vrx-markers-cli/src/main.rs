//! VRX Markers - Waypoint marker driver
//!
//! Draws the waypoints of a TOML plan and streams the marker requests
//! as JSON lines on stdout.

mod plan;
mod printer;

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vrx_markers::{load_markers_file, BroadcastPublisher, WaypointMarkers};

#[derive(Parser, Debug)]
#[command(name = "vrx-markers")]
#[command(about = "Draw VRX waypoint markers from a plan file")]
#[command(version)]
struct Args {
    /// Path to the waypoint plan (TOML)
    #[arg(short, long, default_value = "waypoints.toml")]
    plan: PathBuf,

    /// SDF file whose <markers> element is applied after the plan's [markers]
    #[arg(short, long)]
    sdf: Option<PathBuf>,

    /// Marker namespace (overrides the plan)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout carries the markers
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("VRX markers v{}", env!("CARGO_PKG_VERSION"));

    let mut plan = plan::load_plan(&args.plan)?;
    if let Some(namespace) = args.namespace {
        plan.namespace = namespace;
    }

    // Sized to the plan so no marker is overwritten before it is printed
    let publisher = BroadcastPublisher::new(plan.topic_capacity());
    let rx = publisher.subscribe();

    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        printer::print_markers(rx, &mut stdout).await
    });

    let mut markers = WaypointMarkers::new(plan.namespace.clone(), publisher);
    markers.load(plan.markers.as_ref());

    if let Some(sdf) = &args.sdf {
        let params = load_markers_file(sdf)?;
        if params.is_none() {
            warn!(path = %sdf.display(), "No <markers> element in SDF, keeping configuration");
        }
        markers.load(params.as_ref());
    }

    let mut failed = 0usize;
    for waypoint in &plan.waypoints {
        if waypoint.draw(&mut markers).is_err() {
            failed += 1;
        }
    }

    // Closing the topic ends the printer once it has drained
    drop(markers);
    let stats = printer.await??;

    info!(
        drawn = plan.waypoints.len() - failed,
        failed,
        printed = stats.printed,
        "Finished drawing waypoints"
    );

    if stats.lost > 0 {
        bail!("{} markers were lost before reaching stdout", stats.lost);
    }

    Ok(())
}
