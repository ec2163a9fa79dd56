//! Headless embedding of the terrain generator.
//!
//! Stands in for an engine's frame loop: `initialize` runs once, `tick` runs
//! every frame with the elapsed time.

use std::time::Instant;

use anyhow::{Context, Result};
use heightfield_core::TerrainConfig;
use heightfield_terrain::{GenerationReport, MaterialId, TerrainGenerator};
use heightfield_testkit::{
    MetricsReport, MetricsReportBuilder, PoolMetrics, TerrainMetrics, TestExecutionMetrics,
    TestResult,
};
use tracing::info;

use crate::settings::{lookup_setting, SettingsPanel};
use crate::sinks::{LoggingCamera, RecordingRenderer};

/// Material bound at startup.
pub const DEFAULT_MATERIAL: MaterialId = MaterialId(0);

/// Generator, settings panel and frame bookkeeping.
pub struct HeadlessApp {
    generator: TerrainGenerator<RecordingRenderer>,
    panel: SettingsPanel,
    frames: u64,
    generation_times_us: Vec<u128>,
    vertices: usize,
    triangles: usize,
    started: Instant,
}

impl HeadlessApp {
    /// Wire up a generator for `config` with headless collaborators.
    pub fn new(config: TerrainConfig, debounce_secs: f32) -> Result<Self> {
        let generator = TerrainGenerator::new(config, RecordingRenderer::new())?
            .with_material(DEFAULT_MATERIAL)
            .with_camera(LoggingCamera::default());
        let panel = SettingsPanel::new(generator.config()).with_delay(debounce_secs);
        Ok(Self {
            generator,
            panel,
            frames: 0,
            generation_times_us: Vec::new(),
            vertices: 0,
            triangles: 0,
            started: Instant::now(),
        })
    }

    /// The generator.
    pub fn generator(&self) -> &TerrainGenerator<RecordingRenderer> {
        &self.generator
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Generate the first terrain and frame the camera.
    pub fn initialize(&mut self) -> Result<GenerationReport> {
        let report = self
            .generator
            .initialize()
            .context("failed to initialize terrain")?;
        self.record(&report);
        Ok(report)
    }

    /// Move the slider for `field` to `t`.
    pub fn slide(&mut self, field: &str, t: f64) -> Result<f64> {
        let setting =
            lookup_setting(field).with_context(|| format!("no slider for field `{field}`"))?;
        Ok(self.panel.slide(setting, t)?)
    }

    /// Switch material and rebuild immediately.
    pub fn select_material(&mut self, material: MaterialId) -> Result<GenerationReport> {
        self.generator.set_material(material);
        let config = self.generator.config().clone();
        let report = self.generator.regenerate(config)?;
        self.record(&report);
        Ok(report)
    }

    /// Show or hide the boundary; showing it also rebuilds the terrain.
    pub fn set_boundary_visible(&mut self, visible: bool) -> Result<Option<GenerationReport>> {
        self.generator.set_boundary_visible(visible);
        if !visible {
            return Ok(None);
        }
        let config = self.generator.config().clone();
        let report = self.generator.regenerate(config)?;
        self.record(&report);
        Ok(Some(report))
    }

    /// Advance one frame.
    pub fn tick(&mut self, dt: f32) -> Result<Option<GenerationReport>> {
        self.frames += 1;
        let report = self.panel.tick(dt, &mut self.generator)?;
        if let Some(report) = &report {
            info!(frame = self.frames, chunks = report.chunks, "terrain rebuilt");
            self.record(report);
        }
        self.generator.tick();
        Ok(report)
    }

    /// True while a slider edit has not been applied yet.
    pub fn has_pending_edit(&self) -> bool {
        self.panel.is_pending()
    }

    /// Metrics for every generation pass of this run.
    pub fn metrics_report(&self, test_name: &str) -> MetricsReport {
        let pool = self.generator.builder().pool().stats();
        MetricsReportBuilder::new(test_name)
            .result(TestResult::Pass)
            .terrain(TerrainMetrics::from_timings(
                &self.generation_times_us,
                self.vertices,
                self.triangles,
            ))
            .pool(PoolMetrics {
                checkouts: pool.checkouts,
                allocations: pool.allocations,
                idle: pool.idle,
            })
            .execution(TestExecutionMetrics {
                duration_seconds: self.started.elapsed().as_secs_f64(),
                peak_memory_mb: None,
                assertions_checked: None,
                validations_passed: None,
            })
            .build()
    }

    fn record(&mut self, report: &GenerationReport) {
        // Per-chunk average; the generator times whole passes.
        let per_chunk = report.elapsed.as_micros() / report.chunks.max(1) as u128;
        self.generation_times_us
            .extend(std::iter::repeat(per_chunk).take(report.chunks));
        self.vertices += report.vertices;
        self.triangles += report.triangles;
    }
}
