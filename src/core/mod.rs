#![allow(missing_docs)] // Doc comments live on the public items in each submodule

//! Event-driven hard-disk dynamics in a 2D box.
//!
//! Leaf-first: [`vector`] arithmetic, the [`Collidable`] capability shared by
//! [`Particle`] and [`Wall`], the [`CollisionEvent`] value type, the
//! [`BrownSystem`] that owns all bodies, and the [`SimulationEngine`] that
//! drives it from one collision to the next.

pub mod collidable;
pub mod engine;
pub mod event;
pub mod particle;
pub mod system;
pub mod vector;
pub mod wall;

pub use collidable::Collidable;
pub use engine::{EngineState, SimulationEngine};
pub use event::{CollisionEvent, CollisionTarget, EventKind};
pub use particle::Particle;
pub use system::{BrownSystem, BrownSystemState, ParticleState, TRACKED};
pub use vector::Vector2D;
pub use wall::{Orientation, Wall};
