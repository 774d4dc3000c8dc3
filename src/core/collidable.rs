use crate::core::Particle;

/// Something a moving particle can run into.
///
/// Implemented by [`Particle`] (hard-disk collisions) and
/// [`Wall`](crate::core::Wall) (specular reflection).
pub trait Collidable {
    /// Time from now until `probe` first touches `self`, or `None` when the two
    /// never meet on their current straight-line trajectories.
    ///
    /// Must not mutate either party.
    fn predict_collision_time(&self, probe: &Particle) -> Option<f64>;

    /// Resolve a contact with `probe`: update velocities and bump the collision
    /// counter of every particle involved.
    fn resolve_collision(&mut self, probe: &mut Particle);
}
