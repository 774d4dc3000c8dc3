//! Writers that turn a finished run into files for external tools.

pub mod octave;
pub mod ovito;

pub use octave::{OctaveEventsSaver, OctaveTimeSeriesSaver};
pub use ovito::OvitoSaver;

use crate::core::{BrownSystemState, CollisionEvent, SimulationEngine};
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Read-only view of a finished run.
#[derive(Debug, Clone, Copy)]
pub struct RunRecord<'a> {
    /// Snapshots at `0, dt2, 2*dt2, ...`.
    pub frames: &'a [BrownSystemState],
    /// Executed collisions in time order.
    pub events: &'a [CollisionEvent],
    pub duration: f64,
    pub dt2: f64,
}

impl<'a> RunRecord<'a> {
    pub fn from_engine(engine: &'a SimulationEngine, duration: f64) -> Self {
        Self {
            frames: engine.frames(),
            events: engine.processed_events(),
            duration,
            dt2: engine.dt2(),
        }
    }
}

/// A consumer of a finished run.
pub trait DataSaver {
    /// Serialize `record` into `writer`.
    fn write_to(&self, record: &RunRecord<'_>, writer: &mut dyn Write) -> Result<()>;

    /// Destination file.
    fn path(&self) -> &Path;

    /// Create the destination (and its parent directories) and write `record`.
    fn save(&self, record: &RunRecord<'_>) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(record, &mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "output written");
        Ok(())
    }
}

/// Savers for every configured output path.
pub fn savers_for(
    ovito: Option<PathBuf>,
    time_series: Option<PathBuf>,
    events: Option<PathBuf>,
) -> Vec<Box<dyn DataSaver>> {
    let mut out: Vec<Box<dyn DataSaver>> = Vec::new();
    if let Some(p) = ovito {
        out.push(Box::new(OvitoSaver::new(p)));
    }
    if let Some(p) = time_series {
        out.push(Box::new(OctaveTimeSeriesSaver::new(p)));
    }
    if let Some(p) = events {
        out.push(Box::new(OctaveEventsSaver::new(p)));
    }
    out
}

/// Comma-separated rendering of `values`.
pub(crate) fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>, sep: &str) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}
