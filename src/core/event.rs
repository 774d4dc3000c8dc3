use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// The entity a particle is predicted to run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionTarget {
    /// Another particle, by index.
    Particle(u32),
    /// A wall, by index.
    Wall(u32),
}

/// Kinds of events that can occur in the event-driven engine.
///
/// Tie-breaking for deterministic ordering prefers `ParticleParticle` < `ParticleWall`
/// when times are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ParticleParticle,
    ParticleWall,
}

/// A predicted collision in the priority queue, with deterministic ordering.
///
/// - `time`: absolute instant at which the collision happens (finite, non-NaN).
/// - `collider`: index of the moving particle.
/// - `target`: what it runs into.
/// - `cc_collider`, `cc_target`: collision-count snapshots for invalidation
///   (`cc_target` is `None` for walls).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub time: NotNan<f64>,
    pub collider: u32,
    pub target: CollisionTarget,
    pub cc_collider: u64,
    pub cc_target: Option<u64>,
}

impl CollisionEvent {
    /// Event between particles `collider` and `other`.
    pub fn particle_particle(
        time: f64,
        collider: u32,
        other: u32,
        cc_collider: u64,
        cc_other: u64,
    ) -> Result<Self> {
        if collider == other {
            return Err(Error::InvalidParam(format!(
                "particle {collider} cannot collide with itself"
            )));
        }
        Ok(Self {
            time: checked_time(time)?,
            collider,
            target: CollisionTarget::Particle(other),
            cc_collider,
            cc_target: Some(cc_other),
        })
    }

    /// Event between particle `collider` and wall `wall`.
    pub fn particle_wall(time: f64, collider: u32, wall: u32, cc_collider: u64) -> Result<Self> {
        Ok(Self {
            time: checked_time(time)?,
            collider,
            target: CollisionTarget::Wall(wall),
            cc_collider,
            cc_target: None,
        })
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        match self.target {
            CollisionTarget::Particle(_) => EventKind::ParticleParticle,
            CollisionTarget::Wall(_) => EventKind::ParticleWall,
        }
    }

    /// Particle indices whose state this event changes.
    pub fn participants(&self) -> impl Iterator<Item = u32> {
        let other = match self.target {
            CollisionTarget::Particle(j) => Some(j),
            CollisionTarget::Wall(_) => None,
        };
        std::iter::once(self.collider).chain(other)
    }

    /// Validate against current collision-counts. Pass `None` for `cc_target_now`
    /// when the target is a wall.
    #[inline]
    pub fn is_valid(&self, cc_collider_now: u64, cc_target_now: Option<u64>) -> bool {
        if self.cc_collider != cc_collider_now {
            return false;
        }
        match (self.cc_target, cc_target_now) {
            (Some(a), Some(b)) => a == b,
            (None, _) => true,
            // The event expected a second particle but none is known now.
            (Some(_), None) => false,
        }
    }

    #[inline]
    fn order_key(&self) -> (u8, u32, u32) {
        match self.target {
            CollisionTarget::Particle(j) => (0, self.collider, j),
            CollisionTarget::Wall(w) => (1, self.collider, w),
        }
    }
}

fn checked_time(time: f64) -> Result<NotNan<f64>> {
    if !time.is_finite() {
        return Err(Error::MathError(format!(
            "event time must be finite, got {time}"
        )));
    }
    NotNan::new(time).map_err(|_| Error::MathError("event time cannot be NaN".into()))
}

impl Ord for CollisionEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.order_key().cmp(&other.order_key()))
            // Final tie-breaker on cc snapshots to ensure a total order.
            .then_with(|| {
                (self.cc_collider, self.cc_target.unwrap_or(0))
                    .cmp(&(other.cc_collider, other.cc_target.unwrap_or(0)))
            })
    }
}

impl PartialOrd for CollisionEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    #[test]
    fn new_event_rejects_nan_time() {
        let err = CollisionEvent::particle_particle(f64::NAN, 1, 2, 0, 0).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn new_event_rejects_self_collision() {
        assert!(CollisionEvent::particle_particle(1.0, 3, 3, 0, 0).is_err());
    }

    #[test]
    fn ordering_by_time() -> Result<()> {
        let e1 = CollisionEvent::particle_particle(1.0, 0, 1, 0, 0)?;
        let e2 = CollisionEvent::particle_wall(2.0, 0, 0, 0)?;
        assert!(e1 < e2);
        Ok(())
    }

    #[test]
    fn tie_breaker_prefers_particle_pairs_then_indices() -> Result<()> {
        let t = 5.0;
        let pp = CollisionEvent::particle_particle(t, 2, 3, 3, 4)?;
        let pw_low = CollisionEvent::particle_wall(t, 0, 1, 3)?;
        let pw_high = CollisionEvent::particle_wall(t, 0, 2, 3)?;
        assert!(pp < pw_low); // particle-particle first at equal time
        assert!(pw_low < pw_high);
        Ok(())
    }

    #[test]
    fn min_heap_pops_earliest() -> Result<()> {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(CollisionEvent::particle_wall(3.0, 0, 0, 0)?));
        heap.push(Reverse(CollisionEvent::particle_wall(1.0, 1, 0, 0)?));
        heap.push(Reverse(CollisionEvent::particle_particle(2.0, 0, 1, 0, 0)?));
        let times: Vec<f64> = std::iter::from_fn(|| heap.pop())
            .map(|Reverse(e)| e.time_f64())
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn is_valid_checks_collision_counts() -> Result<()> {
        let e_pp = CollisionEvent::particle_particle(1.0, 1, 2, 10, 20)?;
        assert!(e_pp.is_valid(10, Some(20)));
        assert!(!e_pp.is_valid(11, Some(20)));
        assert!(!e_pp.is_valid(10, Some(21)));
        assert!(!e_pp.is_valid(10, None));

        let e_pw = CollisionEvent::particle_wall(1.0, 3, 0, 7)?;
        assert!(e_pw.is_valid(7, None));
        assert!(!e_pw.is_valid(8, None));
        Ok(())
    }

    #[test]
    fn participants_and_kind() -> Result<()> {
        let e_pp = CollisionEvent::particle_particle(1.0, 1, 4, 0, 0)?;
        assert_eq!(e_pp.kind(), EventKind::ParticleParticle);
        assert_eq!(e_pp.participants().collect::<Vec<_>>(), vec![1, 4]);

        let e_pw = CollisionEvent::particle_wall(1.0, 2, 3, 0)?;
        assert_eq!(e_pw.kind(), EventKind::ParticleWall);
        assert_eq!(e_pw.participants().collect::<Vec<_>>(), vec![2]);
        Ok(())
    }
}
