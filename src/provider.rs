//! Initial configurations for a [`BrownSystem`](crate::core::BrownSystem).
//!
//! A provider builds the walls once and is asked for a fresh particle set on
//! every reset. The first particle of every set is the tracked particle.

use crate::core::{Particle, Vector2D, Wall};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, warn};

/// Consecutive failed placement attempts tolerated before giving up.
pub const MAX_PLACEMENT_TRIES: usize = 3000;

/// Default bound on each initial velocity component of ordinary particles.
pub const DEFAULT_MAX_SPEED: f64 = 0.1;

/// Outcome of one placement round.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Tracked particle first, then the ordinary particles that fit.
    pub particles: Vec<Particle>,
    /// Number of ordinary particles that were asked for.
    pub requested: usize,
}

impl Placement {
    /// Ordinary particles actually placed.
    pub fn placed(&self) -> usize {
        self.particles.len().saturating_sub(1)
    }

    /// How many requested particles could not be placed.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed())
    }
}

/// Source of walls and initial particles.
pub trait ConfigurationProvider: Send + Sync {
    fn build_walls(&self) -> Result<Vec<Wall>>;

    /// A fresh, non-overlapping particle set; index 0 is the tracked particle.
    fn create_particles(&mut self) -> Result<Placement>;
}

/// The four walls of the square box `[0, length] x [0, length]`:
/// left, bottom, right, top.
pub fn square_box(length: f64) -> Result<Vec<Wall>> {
    Ok(vec![
        Wall::vertical(0.0, 0.0, length)?,
        Wall::horizontal(0.0, 0.0, length)?,
        Wall::vertical(length, 0.0, length)?,
        Wall::horizontal(0.0, length, length)?,
    ])
}

/// Random placement inside a square box: one heavy tracked particle at rest
/// plus `count` light particles with small random velocities.
#[derive(Debug)]
pub struct RandomLayout {
    length: f64,
    tracked_mass: f64,
    tracked_radius: f64,
    mass: f64,
    radius: f64,
    count: usize,
    max_speed: f64,
    seed: u64,
    rng: StdRng,
}

impl RandomLayout {
    /// Validate the box and particle parameters.
    ///
    /// `seed: None` draws a seed from the thread RNG; it is logged and
    /// available through [`RandomLayout::seed`] so the run can be replayed.
    pub fn new(
        length: f64,
        (tracked_mass, tracked_radius): (f64, f64),
        (mass, radius): (f64, f64),
        count: usize,
        seed: Option<u64>,
    ) -> Result<Self> {
        for (name, value) in [
            ("box length", length),
            ("tracked particle mass", tracked_mass),
            ("tracked particle radius", tracked_radius),
            ("particle mass", mass),
            ("particle radius", radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParam(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if length <= 2.0 * tracked_radius || length <= 2.0 * radius {
            return Err(Error::InvalidParam(
                "box length must exceed every particle diameter".into(),
            ));
        }
        let seed = seed.unwrap_or_else(|| rng().random());
        debug!(seed, "random layout seeded");
        Ok(Self {
            length,
            tracked_mass,
            tracked_radius,
            mass,
            radius,
            count,
            max_speed: DEFAULT_MAX_SPEED,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Bound on each initial velocity component (default [`DEFAULT_MAX_SPEED`]).
    pub fn with_max_speed(mut self, max_speed: f64) -> Result<Self> {
        if !max_speed.is_finite() || max_speed < 0.0 {
            return Err(Error::InvalidParam(
                "max_speed must be finite and >= 0".into(),
            ));
        }
        self.max_speed = max_speed;
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn random_position(&mut self, radius: f64) -> Vector2D {
        let span = self.length - 2.0 * radius;
        Vector2D::new(
            radius + self.rng.random::<f64>() * span,
            radius + self.rng.random::<f64>() * span,
        )
    }

    fn random_velocity(&mut self) -> Vector2D {
        let s = self.max_speed;
        if s == 0.0 {
            return Vector2D::ZERO;
        }
        Vector2D::new(
            self.rng.random_range(-s..=s),
            self.rng.random_range(-s..=s),
        )
    }
}

impl ConfigurationProvider for RandomLayout {
    fn build_walls(&self) -> Result<Vec<Wall>> {
        square_box(self.length)
    }

    fn create_particles(&mut self) -> Result<Placement> {
        let r = self.random_position(self.tracked_radius);
        let tracked = Particle::new(0, r, Vector2D::ZERO, self.tracked_radius, self.tracked_mass)?;

        let mut particles: Vec<Particle> = Vec::with_capacity(self.count + 1);
        particles.push(tracked);

        // Consecutive failures since the last successful placement
        let mut tries = 0usize;
        while tries < MAX_PLACEMENT_TRIES && particles.len() < self.count + 1 {
            let r = self.random_position(self.radius);
            let v = self.random_velocity();
            let candidate = Particle::new(particles.len() as u32, r, v, self.radius, self.mass)?;
            if particles.iter().any(|p| p.overlaps(&candidate)) {
                tries += 1;
            } else {
                particles.push(candidate);
                tries = 0;
            }
        }

        let placement = Placement {
            particles,
            requested: self.count,
        };
        if placement.shortfall() > 0 {
            warn!(
                requested = placement.requested,
                placed = placement.placed(),
                "could not place the requested amount of particles; continuing with fewer"
            );
        }
        Ok(placement)
    }
}

/// Replays an explicit configuration on every reset.
#[derive(Debug, Clone)]
pub struct FixedLayout {
    walls: Vec<Wall>,
    particles: Vec<Particle>,
}

impl FixedLayout {
    /// `particles[0]` is the tracked particle; at least one particle is required.
    pub fn new(walls: Vec<Wall>, particles: Vec<Particle>) -> Result<Self> {
        if particles.is_empty() {
            return Err(Error::InvalidParam(
                "a layout needs at least the tracked particle".into(),
            ));
        }
        Ok(Self { walls, particles })
    }
}

impl ConfigurationProvider for FixedLayout {
    fn build_walls(&self) -> Result<Vec<Wall>> {
        Ok(self.walls.clone())
    }

    fn create_particles(&mut self) -> Result<Placement> {
        Ok(Placement {
            particles: self.particles.clone(),
            requested: self.particles.len() - 1,
        })
    }
}
