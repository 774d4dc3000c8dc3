//! Extended-XYZ animation frames for Ovito.

use crate::core::{BrownSystemState, ParticleState, Vector2D};
use crate::error::Result;
use crate::io::{DataSaver, RunRecord};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Radius used to draw wall endpoints.
const WALL_MARKER_RADIUS: f64 = 0.0001;

/// One frame per snapshot: `x y vx vy radius r g b` per particle, then two
/// marker points per wall.
#[derive(Debug, Clone)]
pub struct OvitoSaver {
    path: PathBuf,
}

impl OvitoSaver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_frame(w: &mut dyn Write, state: &BrownSystemState, frame: usize) -> Result<()> {
        writeln!(w, "{}", state.particles.len() + 2 * state.walls.len())?;
        writeln!(w, "{frame}")?;
        for p in &state.particles {
            let (red, green, blue) = color(p);
            writeln!(
                w,
                "{} {} {} {} {} {red} {green} {blue}",
                p.r.x, p.r.y, p.v.x, p.v.y, p.radius
            )?;
        }
        for wall in &state.walls {
            write_marker(w, wall.start())?;
            write_marker(w, wall.end())?;
        }
        Ok(())
    }
}

/// The tracked particle is drawn red, every other particle white.
fn color(p: &ParticleState) -> (f64, f64, f64) {
    if p.id == 0 {
        (1.0, 0.0, 0.0)
    } else {
        (1.0, 1.0, 1.0)
    }
}

fn write_marker(w: &mut dyn Write, at: Vector2D) -> Result<()> {
    writeln!(w, "{} {} 0 0 {WALL_MARKER_RADIUS} 1 1 1", at.x, at.y)?;
    Ok(())
}

impl DataSaver for OvitoSaver {
    fn write_to(&self, record: &RunRecord<'_>, writer: &mut dyn Write) -> Result<()> {
        for (frame, state) in record.frames.iter().enumerate() {
            Self::write_frame(writer, state, frame)?;
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
