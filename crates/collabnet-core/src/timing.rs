//! Step timings and process memory snapshots for the run log.
//!
//! A [`RunTimer`] is owned by one analysis run; nothing here is global. Each
//! call to [`RunTimer::step`] records wall time and the resident set size
//! right after the step, and emits both through `tracing` so they land in the
//! run log artifact.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

/// Resident memory of the current process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub rss_bytes: u64,
}

impl MemorySnapshot {
    /// Capture the current process memory; zeros where unsupported.
    #[must_use]
    pub fn capture() -> Self {
        #[cfg(target_os = "linux")]
        {
            Self::capture_linux()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::default()
        }
    }

    #[cfg(target_os = "linux")]
    fn capture_linux() -> Self {
        // /proc/self/statm: total and resident sizes in pages.
        let Ok(content) = std::fs::read_to_string("/proc/self/statm") else {
            return Self::default();
        };
        let mut parts = content.split_whitespace().skip(1);
        let page_size = 4096u64;
        let rss_pages = parts.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        Self {
            rss_bytes: rss_pages * page_size,
        }
    }

    #[must_use]
    pub fn rss_mb(&self) -> f64 {
        self.rss_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Log the current process memory under a step label.
pub fn log_memory(step: &str) -> MemorySnapshot {
    let snapshot = MemorySnapshot::capture();
    info!(step, rss_mb = snapshot.rss_mb(), "memory");
    snapshot
}

/// Timing and memory for one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTiming {
    pub name: String,
    pub elapsed: Duration,
    pub rss_after_bytes: u64,
}

/// Accumulates step timings for one run.
#[derive(Debug)]
pub struct RunTimer {
    started_at: DateTime<Utc>,
    started: Instant,
    steps: Vec<StepTiming>,
}

impl Default for RunTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            steps: Vec::new(),
        }
    }

    /// Run `f`, recording its duration and the memory footprint afterwards.
    pub fn step<R>(&mut self, name: &str, f: impl FnOnce() -> R) -> R {
        let started = Instant::now();
        let result = f();
        let elapsed = started.elapsed();
        let memory = MemorySnapshot::capture();

        info!(
            step = name,
            elapsed = %format_duration(elapsed),
            rss_mb = memory.rss_mb(),
            "step finished"
        );

        self.steps.push(StepTiming {
            name: name.to_string(),
            elapsed,
            rss_after_bytes: memory.rss_bytes,
        });
        result
    }

    /// Wall time since the timer was created.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Render the recorded steps as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let steps = self
            .steps
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "elapsed_us": s.elapsed.as_micros(),
                    "rss_after_bytes": s.rss_after_bytes,
                })
            })
            .collect::<Vec<_>>();

        json!({
            "started_at": self.started_at.to_rfc3339(),
            "total_us": self.total().as_micros(),
            "steps": steps,
        })
    }

    /// Render the recorded steps as a simple table for terminal output.
    #[must_use]
    pub fn display_table(&self) -> String {
        if self.steps.is_empty() {
            return "No steps recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("step                           elapsed     rss_mb\n");
        out.push_str("--------------------------------------------------\n");

        for s in &self.steps {
            out.push_str(&format!(
                "{:<28} {:>9} {:>10.2}\n",
                s.name,
                format_duration(s.elapsed),
                s.rss_after_bytes as f64 / (1024.0 * 1024.0)
            ));
        }

        out
    }
}

/// Human-readable duration (`1.234s`, `12.345ms`, `87µs`).
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        let secs = micros / 1_000_000;
        let millis = (micros % 1_000_000) / 1_000;
        format!("{secs}.{millis:03}s")
    } else if micros >= 1_000 {
        let millis = micros / 1_000;
        let rem = micros % 1_000;
        format!("{millis}.{rem:03}ms")
    } else {
        format!("{micros}µs")
    }
}
