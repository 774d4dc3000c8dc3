//! Run parameters, loadable from YAML.
//!
//! ```yaml
//! system:
//!   box_length: 0.5
//!   particle_count: 100
//!   particle_radius: 0.005
//!   particle_mass: 0.1
//!   tracked_radius: 0.05
//!   tracked_mass: 100.0
//!   max_speed: 0.1
//!   seed: 42            # optional
//! simulation:
//!   duration: 60.0
//!   output_interval: 0.1
//! output:               # every entry optional
//!   ovito: out/frames.xyz
//!   time_series: out/series.m
//!   events: out/events.m
//! ```
//!
//! Missing keys fall back to [`RunParameters::default`].

use crate::core::{BrownSystem, SimulationEngine};
use crate::error::{Error, Result};
use crate::provider::{RandomLayout, DEFAULT_MAX_SPEED};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Box and particle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub box_length: f64,
    pub particle_count: usize,
    pub particle_radius: f64,
    pub particle_mass: f64,
    pub tracked_radius: f64,
    pub tracked_mass: f64,
    /// Bound on each initial velocity component of ordinary particles.
    pub max_speed: f64,
    pub seed: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            box_length: 0.5,
            particle_count: 100,
            particle_radius: 0.005,
            particle_mass: 0.1,
            tracked_radius: 0.05,
            tracked_mass: 100.0,
            max_speed: DEFAULT_MAX_SPEED,
            seed: None,
        }
    }
}

/// Time axis of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub duration: f64,
    /// Snapshot cadence (`dt2`).
    pub output_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: 60.0,
            output_interval: 0.1,
        }
    }
}

/// Where to write results; unset entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub ovito: Option<PathBuf>,
    pub time_series: Option<PathBuf>,
    pub events: Option<PathBuf>,
}

/// Everything needed for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    pub system: SystemConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

impl RunParameters {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let params: Self = serde_yaml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject anything the engine cannot run; nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        let s = &self.system;
        for (name, value) in [
            ("box_length", s.box_length),
            ("particle_radius", s.particle_radius),
            ("particle_mass", s.particle_mass),
            ("tracked_radius", s.tracked_radius),
            ("tracked_mass", s.tracked_mass),
            ("duration", self.simulation.duration),
            ("output_interval", self.simulation.output_interval),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParam(format!(
                    "{name} must be finite and > 0 (got {value})"
                )));
            }
        }
        // The tracked particle starts at rest, so only ordinary particles set
        // anything in motion.
        if !s.max_speed.is_finite() || s.max_speed <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "max_speed must be finite and > 0 (got {})",
                s.max_speed
            )));
        }
        if s.particle_count == 0 {
            return Err(Error::InvalidParam(
                "particle_count must be >= 1: with the tracked particle at rest nothing would move"
                    .into(),
            ));
        }
        if self.simulation.output_interval > self.simulation.duration {
            return Err(Error::InvalidParam(
                "output_interval must not exceed duration".into(),
            ));
        }
        if s.box_length <= 2.0 * s.tracked_radius || s.box_length <= 2.0 * s.particle_radius {
            return Err(Error::InvalidParam(
                "box_length must exceed every particle diameter".into(),
            ));
        }
        Ok(())
    }

    /// Random layout described by these parameters.
    pub fn layout(&self) -> Result<RandomLayout> {
        let s = &self.system;
        RandomLayout::new(
            s.box_length,
            (s.tracked_mass, s.tracked_radius),
            (s.particle_mass, s.particle_radius),
            s.particle_count,
            s.seed,
        )?
        .with_max_speed(s.max_speed)
    }

    /// Validated engine, not yet initialized.
    pub fn build_engine(&self) -> Result<SimulationEngine> {
        self.validate()?;
        let system = BrownSystem::new(self.layout()?)?;
        SimulationEngine::new(system, self.simulation.output_interval)
    }
}
