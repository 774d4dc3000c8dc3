use crate::core::{Collidable, CollisionEvent, CollisionTarget, Particle, Vector2D, Wall};
use crate::error::{Error, Result};
use crate::provider::ConfigurationProvider;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Small numeric tolerance for time comparisons.
pub(crate) const EPS_TIME: f64 = 1e-12;

/// Index of the tracked particle inside the particle store.
pub const TRACKED: usize = 0;

/// Hard disks inside a box of straight walls, with one tracked particle.
///
/// Particles live in a contiguous store and `particles[i].id == i`; events refer
/// to particles and walls by index only.
pub struct BrownSystem {
    provider: Box<dyn ConfigurationProvider>,
    particles: Vec<Particle>,
    walls: Vec<Wall>,
    last_updated: f64,
    collisions_reported: usize,
    shortfall: usize,
    clean: bool,
}

impl std::fmt::Debug for BrownSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrownSystem")
            .field("particles", &self.particles.len())
            .field("walls", &self.walls.len())
            .field("last_updated", &self.last_updated)
            .field("clean", &self.clean)
            .finish()
    }
}

impl BrownSystem {
    /// Build the walls and the first particle set from `provider`.
    pub fn new(provider: impl ConfigurationProvider + 'static) -> Result<Self> {
        let provider: Box<dyn ConfigurationProvider> = Box::new(provider);
        let walls = provider.build_walls()?;
        let mut system = Self {
            provider,
            particles: Vec::new(),
            walls,
            last_updated: 0.0,
            collisions_reported: 0,
            shortfall: 0,
            clean: false,
        };
        system.reset()?;
        Ok(system)
    }

    /// Restore an initial configuration. A no-op while nothing has moved since
    /// the previous reset.
    pub fn reset(&mut self) -> Result<()> {
        if self.clean {
            return Ok(());
        }
        let placement = self.provider.create_particles()?;
        let mut particles = placement.particles;
        if particles.is_empty() {
            return Err(Error::InvalidParam(
                "configuration has no tracked particle".into(),
            ));
        }
        for (i, p) in particles.iter_mut().enumerate() {
            p.id = i as u32;
        }
        check_no_overlap(&particles, &self.walls)?;

        self.shortfall = placement.requested.saturating_sub(particles.len() - 1);
        self.particles = particles;
        self.last_updated = 0.0;
        self.collisions_reported = 0;
        self.clean = true;
        debug!(
            particles = self.particles.len(),
            walls = self.walls.len(),
            "system reset"
        );
        Ok(())
    }

    /// Move every particle in a straight line up to `instant`.
    ///
    /// Advancing to the current instant is a no-op; going backwards is an error.
    pub fn advance(&mut self, instant: f64) -> Result<()> {
        if !instant.is_finite() {
            return Err(Error::InvalidParam("instant must be finite".into()));
        }
        if instant < self.last_updated - EPS_TIME {
            return Err(Error::TimeReversal {
                from: self.last_updated,
                to: instant,
            });
        }
        let dt = instant - self.last_updated;
        if dt <= 0.0 {
            return Ok(());
        }
        self.clean = false;
        for p in &mut self.particles {
            p.drift(dt);
        }
        self.last_updated = instant;
        Ok(())
    }

    /// Every predicted collision, each particle pair considered once, plus
    /// every particle against every wall. Instants are `from + dt`.
    pub fn next_collisions(&self, from: f64) -> Result<Vec<CollisionEvent>> {
        self.collect_all(from)
    }

    #[cfg(not(feature = "parallel"))]
    fn collect_all(&self, from: f64) -> Result<Vec<CollisionEvent>> {
        let n = self.particles.len();
        let mut out = Vec::with_capacity(n * (n + self.walls.len()) / 2);
        for i in 0..n {
            self.push_candidates(i, from, |j| j > i, &mut out)?;
        }
        Ok(out)
    }

    #[cfg(feature = "parallel")]
    fn collect_all(&self, from: f64) -> Result<Vec<CollisionEvent>> {
        let chunks = (0..self.particles.len())
            .into_par_iter()
            .map(|i| {
                let mut out = Vec::new();
                self.push_candidates(i, from, |j| j > i, &mut out)?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(chunks.concat())
    }

    /// Predicted collisions touching any particle in `indices`.
    ///
    /// Pairs made only of listed particles are emitted once.
    pub fn next_collisions_involving(
        &self,
        indices: &[usize],
        from: f64,
    ) -> Result<Vec<CollisionEvent>> {
        let mut out = Vec::with_capacity(indices.len() * (self.particles.len() + self.walls.len()));
        for (k, &i) in indices.iter().enumerate() {
            if i >= self.particles.len() {
                return Err(Error::InvalidParam(format!("no particle with index {i}")));
            }
            let earlier = &indices[..k];
            self.push_candidates(i, from, |j| j != i && !earlier.contains(&j), &mut out)?;
        }
        Ok(out)
    }

    /// Predictions for particle `i` against the particles accepted by `pair_with`
    /// and against every wall.
    fn push_candidates(
        &self,
        i: usize,
        from: f64,
        pair_with: impl Fn(usize) -> bool,
        out: &mut Vec<CollisionEvent>,
    ) -> Result<()> {
        let pi = &self.particles[i];
        for (j, pj) in self.particles.iter().enumerate() {
            if !pair_with(j) {
                continue;
            }
            if let Some(dt) = pj.predict_collision_time(pi) {
                // Lower index is always the collider so a pair has one canonical form.
                let (a, b) = if i < j { (pi, pj) } else { (pj, pi) };
                out.push(CollisionEvent::particle_particle(
                    from + dt,
                    a.id,
                    b.id,
                    a.collision_count,
                    b.collision_count,
                )?);
            }
        }
        for (w, wall) in self.walls.iter().enumerate() {
            if let Some(dt) = wall.predict_collision_time(pi) {
                out.push(CollisionEvent::particle_wall(
                    from + dt,
                    pi.id,
                    w as u32,
                    pi.collision_count,
                )?);
            }
        }
        Ok(())
    }

    /// Neither party has collided since `event` was predicted.
    pub fn is_valid(&self, event: &CollisionEvent) -> bool {
        let Some(collider) = self.particles.get(event.collider as usize) else {
            return false;
        };
        match event.target {
            CollisionTarget::Particle(j) => match self.particles.get(j as usize) {
                Some(other) => event.is_valid(collider.collision_count, Some(other.collision_count)),
                None => false,
            },
            CollisionTarget::Wall(w) => {
                (w as usize) < self.walls.len() && event.is_valid(collider.collision_count, None)
            }
        }
    }

    /// Resolve `event` at the current instant. Callers advance the system to the
    /// event's instant first.
    pub fn execute(&mut self, event: &CollisionEvent) -> Result<()> {
        self.clean = false;
        let i = event.collider as usize;
        if i >= self.particles.len() {
            return Err(Error::InvalidParam(format!("no particle with index {i}")));
        }
        match event.target {
            CollisionTarget::Particle(j) => {
                let (collider, other) = pair_mut(&mut self.particles, i, j as usize)?;
                other.resolve_collision(collider);
            }
            CollisionTarget::Wall(w) => {
                let wall = self
                    .walls
                    .get_mut(w as usize)
                    .ok_or_else(|| Error::InvalidParam(format!("no wall with index {w}")))?;
                wall.resolve_collision(&mut self.particles[i]);
            }
        }
        Ok(())
    }

    /// Collision count carried by the next snapshot.
    pub fn report_collisions(&mut self, count: usize) {
        self.clean = false;
        self.collisions_reported = count;
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> BrownSystemState {
        BrownSystemState {
            time: self.last_updated,
            particles: self.particles.iter().map(ParticleState::from).collect(),
            walls: self.walls.clone(),
            collisions_in_interval: self.collisions_reported,
        }
    }

    pub fn time(&self) -> f64 {
        self.last_updated
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn tracked(&self) -> &Particle {
        &self.particles[TRACKED]
    }

    /// Requested particles the provider could not place at the last reset.
    pub fn placement_shortfall(&self) -> usize {
        self.shortfall
    }

    /// Total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Total linear momentum (diagnostic).
    pub fn momentum(&self) -> Vector2D {
        self.particles
            .iter()
            .fold(Vector2D::ZERO, |acc, p| acc + p.momentum())
    }
}

/// Disjoint mutable borrows of two particles.
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> Result<(&mut Particle, &mut Particle)> {
    if i == j || i.max(j) >= particles.len() {
        return Err(Error::InvalidParam(format!(
            "invalid particle pair ({i}, {j})"
        )));
    }
    if i < j {
        let (lo, hi) = particles.split_at_mut(j);
        Ok((&mut lo[i], &mut hi[0]))
    } else {
        let (lo, hi) = particles.split_at_mut(i);
        Ok((&mut hi[0], &mut lo[j]))
    }
}

/// Reject configurations where disks overlap each other or stick out of the walls.
fn check_no_overlap(particles: &[Particle], walls: &[Wall]) -> Result<()> {
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            if a.r.distance(b.r) < a.radius + b.radius {
                return Err(Error::InvalidParam(format!(
                    "particles {} and {} overlap",
                    a.id, b.id
                )));
            }
        }
        if let Some(w) = walls.iter().position(|w| crosses(a, w)) {
            return Err(Error::InvalidParam(format!(
                "particle {} crosses wall {w}",
                a.id
            )));
        }
    }
    Ok(())
}

fn crosses(p: &Particle, w: &Wall) -> bool {
    disk_crosses_wall(p.r, p.radius, w, EPS_TIME)
}

/// The disk intersects the segment `w` by more than `tolerance` (touching is allowed).
fn disk_crosses_wall(center: Vector2D, radius: f64, w: &Wall, tolerance: f64) -> bool {
    let (s, e) = (w.start(), w.end());
    let closest = Vector2D::new(
        center.x.clamp(s.x.min(e.x), s.x.max(e.x)),
        center.y.clamp(s.y.min(e.y), s.y.max(e.y)),
    );
    center.distance(closest) < radius - tolerance
}

/// Immutable copy of one particle.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub id: u32,
    pub r: Vector2D,
    pub v: Vector2D,
    pub radius: f64,
    pub mass: f64,
    pub collision_count: u64,
}

impl From<&Particle> for ParticleState {
    fn from(p: &Particle) -> Self {
        Self {
            id: p.id,
            r: p.r,
            v: p.v,
            radius: p.radius,
            mass: p.mass,
            collision_count: p.collision_count,
        }
    }
}

impl ParticleState {
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.v.norm_sq()
    }
}

/// Snapshot of a [`BrownSystem`] at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct BrownSystemState {
    /// Instant at which the snapshot was taken.
    pub time: f64,
    /// Every particle; the tracked particle comes first.
    pub particles: Vec<ParticleState>,
    pub walls: Vec<Wall>,
    /// Collisions executed during the output interval that ended here.
    pub collisions_in_interval: usize,
}

impl BrownSystemState {
    /// `None` only for a hand-built state without particles.
    pub fn tracked(&self) -> Option<&ParticleState> {
        self.particles.get(TRACKED)
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(ParticleState::kinetic_energy).sum()
    }

    /// Pairs of particle ids whose disks overlap by more than `tolerance`.
    pub fn overlapping_pairs(&self, tolerance: f64) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                if a.r.distance(b.r) < a.radius + b.radius - tolerance {
                    out.push((a.id, b.id));
                }
            }
        }
        out
    }

    /// Ids of particles whose disk sticks through a wall by more than `tolerance`.
    pub fn particles_crossing_walls(&self, tolerance: f64) -> Vec<u32> {
        self.particles
            .iter()
            .filter(|p| {
                self.walls
                    .iter()
                    .any(|w| disk_crosses_wall(p.r, p.radius, w, tolerance))
            })
            .map(|p| p.id)
            .collect()
    }
}
