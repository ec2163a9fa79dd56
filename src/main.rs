//! heightfield - chunked fBm terrain mesh generator
//!
//! Headless executable: generates a terrain, replays slider edits through the
//! debounced settings panel and writes CI metrics.

mod app;
mod settings;
mod sinks;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use heightfield_core::{TerrainConfig, DEFAULT_CONFIG_PATH};
use heightfield_terrain::MaterialId;
use heightfield_testkit::{MeshMetricSink, MetricsSink};
use tracing::info;

use app::HeadlessApp;
use settings::DEFAULT_DEBOUNCE_SECS;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chunked fBm terrain mesh generator", long_about = None)]
struct Args {
    /// Terrain config (TOML); defaults are used if the default path is missing
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override a config field, e.g. `--override octaves=6` (repeatable)
    #[arg(long = "override", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    overrides: Vec<(String, f64)>,

    /// Move a slider to a normalized position, e.g. `--slider width=0.5` (repeatable)
    #[arg(long = "slider", value_name = "FIELD=T", value_parser = parse_assignment)]
    sliders: Vec<(String, f64)>,

    /// Switch to this material after initialization
    #[arg(long)]
    material: Option<u32>,

    /// Hide the terrain wire box
    #[arg(long)]
    hide_boundary: bool,

    /// Frames to run after initialization
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Slider debounce delay in seconds
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE_SECS)]
    debounce: f32,

    /// Write per-chunk mesh metrics (JSON)
    #[arg(long)]
    mesh_metrics: Option<PathBuf>,

    /// Write a terrain metrics report (JSON)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Save the final config (TOML)
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Log filter; falls back to RUST_LOG, then `warn`
    #[arg(long)]
    log: Option<String>,
}

fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid value for `{name}`: {err}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    let filter = match &args.log {
        Some(directives) => tracing_subscriber::EnvFilter::new(directives),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting heightfield v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let mut app = HeadlessApp::new(config, args.debounce)?;
    let initial = app.initialize()?;
    info!(
        chunks = initial.chunks,
        vertices = initial.vertices,
        triangles = initial.triangles,
        "initial terrain ready"
    );

    if args.hide_boundary {
        app.set_boundary_visible(false)?;
    }
    if let Some(material) = args.material {
        app.select_material(MaterialId(material))?;
    }
    for (field, t) in &args.sliders {
        app.slide(field, *t)?;
    }
    for _ in 0..args.ticks {
        app.tick(args.dt)?;
    }
    if app.has_pending_edit() {
        tracing::warn!(
            ticks = args.ticks,
            "slider edits still debouncing when the run ended"
        );
    }

    write_outputs(&args, &app)?;

    let renderer = app.generator().renderer();
    println!(
        "{} chunks live after {} frames ({} destroyed, {} boundary draws)",
        renderer.live_count(),
        app.frames(),
        renderer.destroyed_count(),
        renderer.boundary_draws()
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<TerrainConfig> {
    let mut config = match &args.config {
        Some(path) => TerrainConfig::load_from_path(path)?,
        None => TerrainConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    };
    for (field, value) in &args.overrides {
        config = config
            .with_field(field, *value)
            .with_context(|| format!("invalid override {field}={value}"))?;
    }
    Ok(config)
}

fn write_outputs(args: &Args, app: &HeadlessApp) -> Result<()> {
    if let Some(path) = &args.mesh_metrics {
        let metrics = app.generator().renderer().mesh_metrics();
        MeshMetricSink::create(path)
            .and_then(|mut sink| sink.write(&metrics))
            .with_context(|| format!("failed to write mesh metrics {}", path.display()))?;
        info!(path = %path.display(), chunks = metrics.len(), "mesh metrics written");
    }
    if let Some(path) = &args.report {
        let report = app.metrics_report("headless_run");
        MetricsSink::create(path)
            .and_then(|sink| sink.write(&report))
            .with_context(|| format!("failed to write metrics report {}", path.display()))?;
    }
    if let Some(path) = &args.save_config {
        app.generator()
            .config()
            .save_to_path(path)
            .with_context(|| format!("failed to save config {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_parse() {
        assert_eq!(
            parse_assignment("octaves=6").unwrap(),
            ("octaves".to_string(), 6.0)
        );
        assert_eq!(
            parse_assignment(" scale = 0.25").unwrap(),
            ("scale".to_string(), 0.25)
        );
        assert!(parse_assignment("octaves").is_err());
        assert!(parse_assignment("octaves=lots").is_err());
    }

    #[test]
    fn cli_collects_repeated_flags() {
        let args = Args::try_parse_from([
            "heightfield",
            "--override",
            "width=40",
            "--override",
            "octaves=2",
            "--slider",
            "height=0.5",
            "--ticks",
            "5",
        ])
        .unwrap();
        assert_eq!(args.overrides.len(), 2);
        assert_eq!(args.sliders, vec![("height".to_string(), 0.5)]);
        assert_eq!(args.ticks, 5);

        let config = load_config(&Args {
            config: None,
            ..args
        })
        .unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.octaves, 2);
    }
}
