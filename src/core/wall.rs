use crate::core::{Collidable, Particle, Vector2D};
use crate::error::{Error, Result};

/// Round-off allowance for a particle that sits exactly on a wall.
const EPS_CONTACT: f64 = 1e-12;

/// Orientation of an axis-aligned wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Constant y; reflects the y velocity component.
    Horizontal,
    /// Constant x; reflects the x velocity component.
    Vertical,
}

/// A fixed, axis-aligned reflecting segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    start: Vector2D,
    end: Vector2D,
    orientation: Orientation,
}

impl Wall {
    /// Horizontal wall from `(x, y)` to `(x + length, y)`.
    pub fn horizontal(x: f64, y: f64, length: f64) -> Result<Self> {
        validate(x, y, length)?;
        Ok(Self {
            start: Vector2D::new(x, y),
            end: Vector2D::new(x + length, y),
            orientation: Orientation::Horizontal,
        })
    }

    /// Vertical wall from `(x, y)` to `(x, y + length)`.
    pub fn vertical(x: f64, y: f64, length: f64) -> Result<Self> {
        validate(x, y, length)?;
        Ok(Self {
            start: Vector2D::new(x, y),
            end: Vector2D::new(x, y + length),
            orientation: Orientation::Vertical,
        })
    }

    pub fn start(&self) -> Vector2D {
        self.start
    }

    pub fn end(&self) -> Vector2D {
        self.end
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// (wall coordinate, particle coordinate, particle velocity) along the normal axis.
    #[inline]
    fn normal_components(&self, p: &Particle) -> (f64, f64, f64) {
        match self.orientation {
            Orientation::Horizontal => (self.start.y, p.r.y, p.v.y),
            Orientation::Vertical => (self.start.x, p.r.x, p.v.x),
        }
    }
}

fn validate(x: f64, y: f64, length: f64) -> Result<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(Error::InvalidParam("wall origin must be finite".into()));
    }
    if !length.is_finite() || length <= 0.0 {
        return Err(Error::InvalidParam(
            "the length of the wall must be finite and > 0".into(),
        ));
    }
    Ok(())
}

impl Collidable for Wall {
    fn predict_collision_time(&self, probe: &Particle) -> Option<f64> {
        let (wall, pos, vel) = self.normal_components(probe);
        if vel == 0.0 {
            return None;
        }
        // Wall lies behind the direction of travel
        if (vel > 0.0 && wall < pos) || (vel < 0.0 && wall > pos) {
            return None;
        }
        let gap = if vel > 0.0 {
            wall - probe.radius - pos
        } else {
            wall + probe.radius - pos
        };
        let dt = gap / vel;
        if dt >= 0.0 {
            Some(dt)
        } else if dt > -EPS_CONTACT {
            Some(0.0)
        } else {
            None
        }
    }

    fn resolve_collision(&mut self, probe: &mut Particle) {
        let (wall, _, vel) = self.normal_components(probe);
        // Snap onto the contact line before reflecting
        let contact = if vel > 0.0 {
            wall - probe.radius
        } else {
            wall + probe.radius
        };
        match self.orientation {
            Orientation::Horizontal => {
                probe.r.y = contact;
                probe.v.y = -probe.v.y;
            }
            Orientation::Vertical => {
                probe.r.x = contact;
                probe.v.x = -probe.v.x;
            }
        }
        probe.bump_collision_count();
    }
}
