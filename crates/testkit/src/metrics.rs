//! Standardized metrics collection and reporting for CI/CD integration.
//!
//! Terrain tests and the headless binary export one [`MetricsReport`] per run
//! as JSON so regressions in generation time, mesh size or seam quality show
//! up in automated analysis.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Top-level metrics report.
///
/// This is the standardized format for metrics.json files exported by tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/benchmark identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (ISO 8601)
    pub timestamp: String,

    /// Overall test result
    pub result: TestResult,

    /// Terrain generation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Scratch buffer pool metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolMetrics>,

    /// Test execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
}

/// Terrain generation performance and quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Total chunks generated
    pub chunks_generated: usize,

    /// Total vertices generated, seam duplicates included
    pub vertices_generated: usize,

    /// Total triangles generated
    pub triangles_generated: usize,

    /// Average generation time per chunk (microseconds)
    pub avg_gen_time_us: f64,

    /// Min generation time (microseconds)
    pub min_gen_time_us: u128,

    /// Max generation time (microseconds)
    pub max_gen_time_us: u128,

    /// Total generation time (milliseconds)
    pub total_gen_time_ms: f64,

    /// Chunks per second throughput
    pub chunks_per_second: f64,

    /// Chunk seam validation results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seam_validation: Option<SeamValidation>,
}

impl TerrainMetrics {
    /// Summarize per-chunk generation times (microseconds).
    ///
    /// Returns zeroed timings for an empty slice.
    pub fn from_timings(
        gen_times_us: &[u128],
        vertices_generated: usize,
        triangles_generated: usize,
    ) -> Self {
        let chunks = gen_times_us.len();
        let total_us: u128 = gen_times_us.iter().sum();
        let avg_gen_time_us = if chunks == 0 {
            0.0
        } else {
            total_us as f64 / chunks as f64
        };
        let chunks_per_second = if total_us == 0 {
            0.0
        } else {
            chunks as f64 / (total_us as f64 / 1_000_000.0)
        };

        Self {
            chunks_generated: chunks,
            vertices_generated,
            triangles_generated,
            avg_gen_time_us,
            min_gen_time_us: gen_times_us.iter().copied().min().unwrap_or(0),
            max_gen_time_us: gen_times_us.iter().copied().max().unwrap_or(0),
            total_gen_time_ms: total_us as f64 / 1000.0,
            chunks_per_second,
            seam_validation: None,
        }
    }
}

/// Chunk boundary seam validation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeamValidation {
    /// Total seams checked
    pub total_seams: usize,

    /// Seams that passed validation
    pub seams_valid: usize,

    /// Seams that failed validation
    pub seams_failed: usize,

    /// Maximum vertex difference observed at seams
    pub max_seam_diff: f64,

    /// Average vertex difference at seams
    pub avg_seam_diff: f64,
}

/// Scratch buffer pool activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMetrics {
    /// Buffer checkouts served
    pub checkouts: usize,

    /// Checkouts that allocated or grew buffers
    pub allocations: usize,

    /// Buffer sets idle at the end of the run
    pub idle: usize,
}

/// Test execution and infrastructure metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total test duration (seconds)
    pub duration_seconds: f64,

    /// Memory usage peak (MB)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_mb: Option<f64>,

    /// Number of assertions checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                terrain: None,
                pool: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    peak_memory_mb: None,
                    assertions_checked: None,
                    validations_passed: None,
                },
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set terrain metrics
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Set pool metrics
    pub fn pool(mut self, metrics: PoolMetrics) -> Self {
        self.report.pool = Some(metrics);
        self
    }

    /// Set test execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        debug!(path = %self.path.display(), test = %report.test_name, "metrics written");
        Ok(())
    }
}
