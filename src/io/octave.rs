//! Octave/Matlab scripts with time series and collision times.

use crate::error::Result;
use crate::io::{join, DataSaver, RunRecord};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Per-frame series: collisions per interval, tracked trajectory, speeds.
#[derive(Debug, Clone)]
pub struct OctaveTimeSeriesSaver {
    path: PathBuf,
}

impl OctaveTimeSeriesSaver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSaver for OctaveTimeSeriesSaver {
    fn write_to(&self, record: &RunRecord<'_>, w: &mut dyn Write) -> Result<()> {
        writeln!(w, "duration = {};", record.duration)?;
        writeln!(w, "dt = {};", record.dt2)?;
        writeln!(w, "t = 0:dt:duration;")?;
        writeln!(
            w,
            "collisions = [{}];",
            join(record.frames.iter().map(|f| f.collisions_in_interval), ", ")
        )?;
        // One row per frame: x, y of the tracked particle
        writeln!(
            w,
            "bigParticleTrajectory = [{}];",
            join(
                record
                    .frames
                    .iter()
                    .filter_map(|f| f.tracked())
                    .map(|p| format!("{}, {}", p.r.x, p.r.y)),
                "; "
            )
        )?;
        // One row per frame, one column per particle
        writeln!(
            w,
            "velocitiesModules = [{}];",
            join(
                record
                    .frames
                    .iter()
                    .map(|f| join(f.particles.iter().map(|p| p.v.norm()), ", ")),
                "; "
            )
        )?;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Instants of every executed collision.
#[derive(Debug, Clone)]
pub struct OctaveEventsSaver {
    path: PathBuf,
}

impl OctaveEventsSaver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSaver for OctaveEventsSaver {
    fn write_to(&self, record: &RunRecord<'_>, w: &mut dyn Write) -> Result<()> {
        writeln!(
            w,
            "collisionTimes = [{}];",
            join(record.events.iter().map(|e| e.time_f64()), ", ")
        )?;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
