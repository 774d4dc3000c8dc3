use brownsim::core::{
    BrownSystem, CollisionTarget, EventKind, Particle, SimulationEngine, Vector2D,
};
use brownsim::error::Result;
use brownsim::provider::{square_box, FixedLayout};

fn disk(x: f64, y: f64, vx: f64, vy: f64, radius: f64) -> Result<Particle> {
    Particle::new(0, Vector2D::new(x, y), Vector2D::new(vx, vy), radius, 1.0)
}

fn engine(length: f64, particles: Vec<Particle>, dt2: f64) -> Result<SimulationEngine> {
    let system = BrownSystem::new(FixedLayout::new(square_box(length)?, particles)?)?;
    let mut engine = SimulationEngine::new(system, dt2)?;
    engine.initialize()?;
    Ok(engine)
}

/// Two unit disks closing at speed 2 along x swap their x velocities and gain no y velocity.
#[test]
fn head_on_collision_reverses_velocities() -> Result<()> {
    let mut eng = engine(
        20.0,
        vec![
            disk(2.0, 18.0, 0.0, 0.0, 1.0)?,
            disk(6.0, 10.0, 1.0, 0.0, 1.0)?,
            disk(14.0, 10.0, -1.0, 0.0, 1.0)?,
        ],
        1.0,
    )?;
    eng.simulate(4.0)?;

    let events = eng.processed_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::ParticleParticle);
    assert!((events[0].time_f64() - 3.0).abs() < 1e-12);

    let ps = eng.system().particles();
    assert!((ps[1].v.x + 1.0).abs() < 1e-12);
    assert!((ps[2].v.x - 1.0).abs() < 1e-12);
    assert_eq!(ps[1].v.y, 0.0);
    assert_eq!(ps[2].v.y, 0.0);
    // One time unit after contact at x = 9 and x = 11
    assert!((ps[1].r.x - 8.0).abs() < 1e-12);
    assert!((ps[2].r.x - 12.0).abs() < 1e-12);
    Ok(())
}

/// A disk falling onto the floor reflects exactly when its surface touches it.
#[test]
fn wall_bounce_reflects_without_penetration() -> Result<()> {
    let mut eng = engine(10.0, vec![disk(5.0, 5.0, 0.0, -1.0, 0.5)?], 0.5)?;
    eng.simulate(5.0)?;

    let events = eng.processed_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].target, CollisionTarget::Wall(1));
    assert!((events[0].time_f64() - 4.5).abs() < 1e-12);

    let frames = eng.frames();
    assert_eq!(frames[9].time, 4.5);
    let at_contact = frames[9].tracked().expect("tracked particle");
    assert_eq!(at_contact.v, Vector2D::new(0.0, 1.0));
    assert!((at_contact.r.y - 0.5).abs() < 1e-12);
    let later = frames[10].tracked().expect("tracked particle");
    assert!((later.r.y - 1.0).abs() < 1e-12);
    assert_eq!(frames[9].collisions_in_interval, 1);
    Ok(())
}

/// With no ordinary particles the tracked disk only bounces between the four walls.
#[test]
fn lone_tracked_particle_visits_each_wall() -> Result<()> {
    let mut eng = engine(10.0, vec![disk(5.0, 5.0, 1.0, 2.0, 1.0)?], 1.0)?;
    eng.simulate(24.0)?;

    let events = eng.processed_events();
    assert!(events
        .iter()
        .all(|e| e.kind() == EventKind::ParticleWall && e.collider == 0));

    // walls: 0 left, 1 bottom, 2 right, 3 top
    let expected = [(2.0, 3), (4.0, 2), (6.0, 1), (10.0, 3), (12.0, 0), (14.0, 1)];
    for (event, (t, wall)) in events.iter().zip(expected) {
        assert!(
            (event.time_f64() - t).abs() < 1e-9,
            "expected a bounce at t={t}, got {}",
            event.time_f64()
        );
        assert_eq!(event.target, CollisionTarget::Wall(wall));
    }
    for wall in 0..4 {
        assert!(events.iter().any(|e| e.target == CollisionTarget::Wall(wall)));
    }
    for frame in eng.frames() {
        let p = frame.tracked().expect("tracked particle");
        assert!(p.r.x >= 1.0 - 1e-9 && p.r.x <= 9.0 + 1e-9);
        assert!(p.r.y >= 1.0 - 1e-9 && p.r.y <= 9.0 + 1e-9);
        assert!((p.v.norm_sq() - 5.0).abs() < 1e-12);
    }
    Ok(())
}

/// A disk bouncing off the floor into a neighbour it was resting against
/// collides with it at once instead of passing through.
#[test]
fn bounce_into_touching_neighbour_is_resolved() -> Result<()> {
    let mut eng = engine(
        10.0,
        vec![disk(5.0, 3.0, 0.0, -1.0, 1.0)?, disk(5.0, 5.0, 0.0, -1.0, 1.0)?],
        0.5,
    )?;
    eng.simulate(6.0)?;

    let targets: Vec<(u32, CollisionTarget)> = eng
        .processed_events()
        .iter()
        .map(|e| (e.collider, e.target))
        .collect();
    assert_eq!(
        targets,
        vec![
            (0, CollisionTarget::Wall(1)),
            (0, CollisionTarget::Particle(1)),
            (0, CollisionTarget::Wall(1)),
        ]
    );
    assert!(eng
        .processed_events()
        .iter()
        .all(|e| (e.time_f64() - 2.0).abs() < 1e-12));

    for frame in eng.frames() {
        assert!(
            frame.overlapping_pairs(1e-9).is_empty(),
            "disks interpenetrate at t={}",
            frame.time
        );
    }
    let ps = eng.system().particles();
    assert_eq!(ps[0].v, Vector2D::new(0.0, 1.0));
    assert_eq!(ps[1].v, Vector2D::new(0.0, 1.0));
    assert!((ps[1].r.y - ps[0].r.y - 2.0).abs() < 1e-12);
    Ok(())
}
