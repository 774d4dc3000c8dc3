use crate::core::{Collidable, Vector2D};
use crate::error::{Error, Result};

/// Round-off allowance for a pair that is already touching.
const EPS_CONTACT: f64 = 1e-12;

/// A rigid disk in D=2.
///
/// Fields:
/// - `id`: index of the particle inside the owning system
/// - `r`: position of the centre
/// - `v`: velocity
/// - `radius`: hard-disk radius (> 0)
/// - `mass`: particle mass (> 0)
/// - `collision_count`: incremented each time the particle takes part in a collision
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable particle identifier.
    pub id: u32,
    /// Position (x, y).
    pub r: Vector2D,
    /// Velocity (vx, vy).
    pub v: Vector2D,
    /// Hard-disk radius (> 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    /// Collision participation counter (for event invalidation).
    pub collision_count: u64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(id: u32, r: Vector2D, v: Vector2D, radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            id,
            r,
            v,
            radius,
            mass,
            collision_count: 0,
        })
    }

    /// Increment the collision counter (used for event invalidation).
    #[inline]
    pub fn bump_collision_count(&mut self) {
        self.collision_count = self.collision_count.saturating_add(1);
    }

    /// Straight-line motion over `dt`.
    #[inline]
    pub fn drift(&mut self, dt: f64) {
        self.r = self.r.add_scaled(dt, self.v);
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.v.norm_sq()
    }

    #[inline]
    pub fn momentum(&self) -> Vector2D {
        self.v * self.mass
    }

    /// True when the two disks intersect or touch.
    pub fn overlaps(&self, other: &Particle) -> bool {
        self.r.distance(other.r) <= self.radius + other.radius
    }
}

impl Collidable for Particle {
    fn predict_collision_time(&self, probe: &Particle) -> Option<f64> {
        let dr = probe.r - self.r;
        let dv = probe.v - self.v;
        let dv_dr = dv.dot(dr);
        // Separating or moving in parallel
        if dv_dr >= 0.0 {
            return None;
        }
        let dv_sq = dv.norm_sq();
        let sigma = self.radius + probe.radius;
        let d = dv_dr * dv_dr - dv_sq * (dr.norm_sq() - sigma * sigma);
        if d < 0.0 {
            return None;
        }
        let dt = -(dv_dr + d.sqrt()) / dv_sq;
        if !dt.is_finite() || dt <= -EPS_CONTACT {
            return None;
        }
        // Touching and approaching: collide now
        Some(dt.max(0.0))
    }

    fn resolve_collision(&mut self, probe: &mut Particle) {
        let dr = probe.r - self.r;
        let dv = probe.v - self.v;
        let sigma = self.radius + probe.radius;
        let (m1, m2) = (self.mass, probe.mass);

        let j = 2.0 * m1 * m2 * dv.dot(dr) / (sigma * (m1 + m2));
        let impulse = dr * (j / sigma);

        self.v = self.v + impulse * (1.0 / m1);
        probe.v = probe.v - impulse * (1.0 / m2);

        self.bump_collision_count();
        probe.bump_collision_count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(id: u32, x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle::new(id, Vector2D::new(x, y), Vector2D::new(vx, vy), 1.0, 1.0).unwrap()
    }

    #[test]
    fn new_particle_starts_uncollided() -> Result<()> {
        let p = Particle::new(1, Vector2D::new(0.0, 1.0), Vector2D::new(2.0, -3.0), 0.5, 2.0)?;
        assert_eq!(p.collision_count, 0);
        assert_eq!(p.momentum(), Vector2D::new(4.0, -6.0));
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = Particle::new(0, Vector2D::ZERO, Vector2D::ZERO, 0.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn invalid_mass_rejected() {
        let err = Particle::new(0, Vector2D::ZERO, Vector2D::ZERO, 1.0, -1.0).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn non_finite_components_rejected() {
        let err = Particle::new(0, Vector2D::ZERO, Vector2D::new(f64::INFINITY, 0.0), 1.0, 1.0)
            .unwrap_err();
        assert!(err.to_string().contains("velocity"));
        let err = Particle::new(0, Vector2D::new(1.0, f64::NAN), Vector2D::ZERO, 1.0, 1.0)
            .unwrap_err();
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn drift_follows_velocity_in_the_plane() -> Result<()> {
        let mut p = Particle::new(0, Vector2D::new(1.0, 2.0), Vector2D::new(0.5, -1.0), 0.1, 1.0)?;
        p.drift(2.0);
        assert_eq!(p.r, Vector2D::new(2.0, 0.0));
        p.drift(0.0);
        assert_eq!(p.r, Vector2D::new(2.0, 0.0));
        assert_eq!(p.v, Vector2D::new(0.5, -1.0));
        Ok(())
    }

    #[test]
    fn energy_uses_both_velocity_components() -> Result<()> {
        // |(3, -4)|^2 = 25
        let p = Particle::new(7, Vector2D::ZERO, Vector2D::new(3.0, -4.0), 1.0, 2.0)?;
        assert!((p.kinetic_energy() - 25.0).abs() < 1e-12);
        assert_eq!(p.momentum(), Vector2D::new(6.0, -8.0));
        Ok(())
    }

    #[test]
    fn touching_disks_overlap_but_distant_do_not() {
        let a = disk(0, 0.0, 0.0, 0.0, 0.0);
        assert!(a.overlaps(&disk(1, 0.0, 2.0, 0.0, 0.0)));
        assert!(!a.overlaps(&disk(1, 1.5, 1.6, 0.0, 0.0)));
    }

    #[test]
    fn head_on_prediction() {
        // Centres 4 apart, radii sum 2, closing speed 2 => gap 2 closes at t = 1
        let a = disk(0, 0.0, 0.0, 1.0, 0.0);
        let b = disk(1, 4.0, 0.0, -1.0, 0.0);
        let t = b.predict_collision_time(&a).expect("should collide");
        assert!((t - 1.0).abs() < 1e-12);
        // symmetric
        let t2 = a.predict_collision_time(&b).expect("should collide");
        assert!((t - t2).abs() < 1e-12);
    }

    #[test]
    fn separating_particles_never_collide() {
        let a = disk(0, 0.0, 0.0, -1.0, 0.0);
        let b = disk(1, 4.0, 0.0, 1.0, 0.0);
        assert!(b.predict_collision_time(&a).is_none());
    }

    #[test]
    fn resting_pair_never_collides() {
        let a = disk(0, 0.0, 0.0, 0.0, 0.0);
        let b = disk(1, 4.0, 0.0, 0.0, 0.0);
        assert!(b.predict_collision_time(&a).is_none());
    }

    #[test]
    fn missing_trajectories_never_collide() {
        // Approaching in x but offset by 3 in y with radii sum 2
        let a = disk(0, 0.0, 0.0, 1.0, 0.0);
        let b = disk(1, 10.0, 3.0, -1.0, 0.0);
        assert!(b.predict_collision_time(&a).is_none());
    }

    #[test]
    fn head_on_collision_swaps_velocities() {
        let mut a = disk(0, 0.0, 0.0, 1.0, 0.0);
        let mut b = disk(1, 2.0, 0.0, -1.0, 0.0);
        b.resolve_collision(&mut a);
        assert!((a.v.x + 1.0).abs() < 1e-12);
        assert!((b.v.x - 1.0).abs() < 1e-12);
        assert_eq!(a.v.y, 0.0);
        assert_eq!(b.v.y, 0.0);
        assert_eq!(a.collision_count, 1);
        assert_eq!(b.collision_count, 1);
    }

    #[test]
    fn oblique_collision_conserves_momentum_and_energy() -> Result<()> {
        let mut a = Particle::new(0, Vector2D::new(0.0, 0.0), Vector2D::new(0.7, 0.2), 0.5, 3.0)?;
        let mut b = Particle::new(1, Vector2D::new(2.0, 1.0), Vector2D::new(-0.4, -0.9), 0.7, 0.5)?;
        let t = b.predict_collision_time(&a).expect("should collide");
        a.drift(t);
        b.drift(t);
        assert!((a.r.distance(b.r) - 1.2).abs() < 1e-9);

        let p0 = a.momentum() + b.momentum();
        let e0 = a.kinetic_energy() + b.kinetic_energy();
        b.resolve_collision(&mut a);
        let p1 = a.momentum() + b.momentum();
        let e1 = a.kinetic_energy() + b.kinetic_energy();

        assert!((p0 - p1).norm() < 1e-12, "momentum drifted: {p0:?} -> {p1:?}");
        assert!((e0 - e1).abs() < 1e-12, "energy drifted: {e0} -> {e1}");
        // After the collision the pair separates
        assert!(b.predict_collision_time(&a).is_none());
        Ok(())
    }

    #[test]
    fn touching_and_approaching_collides_now() {
        // Resting contact along y: a moves into b
        let a = disk(0, 5.0, 1.0, 0.0, 1.0);
        let b = disk(1, 5.0, 3.0, 0.0, -1.0);
        assert_eq!(b.predict_collision_time(&a), Some(0.0));
        // Round-off overlap is still a contact
        let b = disk(1, 5.0, 3.0 - 1e-14, 0.0, -1.0);
        assert_eq!(b.predict_collision_time(&a), Some(0.0));
        // Touching but moving apart
        let b = disk(1, 5.0, 3.0, 0.0, 2.0);
        assert!(b.predict_collision_time(&a).is_none());
    }

    #[test]
    fn collision_count_saturates() -> Result<()> {
        let mut p = Particle::new(1, Vector2D::ZERO, Vector2D::ZERO, 1.0, 1.0)?;
        p.bump_collision_count();
        assert_eq!(p.collision_count, 1);
        p.collision_count = u64::MAX;
        p.bump_collision_count();
        assert_eq!(p.collision_count, u64::MAX);
        Ok(())
    }
}
