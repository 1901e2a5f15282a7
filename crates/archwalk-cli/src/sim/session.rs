//! Walk input files and sensor-session replay.

use anyhow::{Context, Result};
use archwalk_core::{
    detect_movement_type, Coordinate, FusionConfig, FusionUpdate, ManualClock, MovementType,
    PositionFusion, RouteOptions, SensorSample, TimedSample, Waypoint,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufRead;
use std::path::Path;

/// Contents of a walk file: where the user stands and what to visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkInput {
    #[serde(alias = "location")]
    pub start: Coordinate,
    #[serde(alias = "places", alias = "buildings")]
    pub waypoints: Vec<Waypoint>,
    /// Per-file route options; command-line flags take precedence
    #[serde(default)]
    pub options: Option<RouteOptions>,
}

impl WalkInput {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read walk file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse walk file {}", path.display()))
    }
}

/// Parse a JSON-lines sensor log. Blank lines and `#` comments are skipped.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<TimedSample>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let sample = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid sensor sample on line {}", index + 1))?;
        samples.push(sample);
    }
    Ok(samples)
}

/// One output line of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayRecord {
    pub timestamp_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    pub update: FusionUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement: Option<MovementType>,
    pub confidence: u8,
    pub prefers_dead_reckoning: bool,
}

/// Drives a [`PositionFusion`] with sample timestamps instead of wall time.
pub struct SessionReplay {
    fusion: PositionFusion<ManualClock>,
    clock: ManualClock,
}

impl SessionReplay {
    /// Start a replay whose clock begins at `start_ms`.
    pub fn new(config: FusionConfig, start_ms: i64) -> Self {
        let clock = ManualClock::new(start_ms);
        Self {
            fusion: PositionFusion::with_clock(config, clock.clone()),
            clock,
        }
    }

    /// Start a replay at the first sample's timestamp.
    pub fn for_samples(config: FusionConfig, samples: &[TimedSample]) -> Self {
        let start_ms = samples.first().map_or(0, |timed| timed.timestamp_ms);
        Self::new(config, start_ms)
    }

    pub fn step(&mut self, timed: &TimedSample) -> ReplayRecord {
        self.clock.set_ms(timed.timestamp_ms);
        let update = self.fusion.apply(&timed.sample);
        let movement = match &timed.sample {
            SensorSample::Imu(imu) => Some(detect_movement_type(&imu.acceleration)),
            _ => None,
        };

        ReplayRecord {
            timestamp_ms: timed.timestamp_ms,
            time: DateTime::from_timestamp_millis(timed.timestamp_ms),
            update,
            movement,
            confidence: self.fusion.confidence(),
            prefers_dead_reckoning: self.fusion.prefers_dead_reckoning(),
        }
    }

    pub fn run(&mut self, samples: &[TimedSample]) -> Vec<ReplayRecord> {
        samples.iter().map(|timed| self.step(timed)).collect()
    }

    pub fn fusion(&self) -> &PositionFusion<ManualClock> {
        &self.fusion
    }
}
