//! Headless physics demo: a ground slab, a trimesh ramp and a handful of
//! falling bodies, stepped for a few simulated seconds with positions
//! logged along the way.

use borealis::prelude::*;

/// Bodies the demo tracks across the session
struct Tracked {
    name: &'static str,
    entity: hecs::Entity,
    body: RigidBodyHandle,
}

fn main() {
    env_logger::init();
    log::info!("Starting physics demo");

    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new();
    physics.start();
    physics.on_play();

    // Scene content: a static ground, a mesh ramp, two dynamic bodies
    let scene: Vec<(&'static str, Transform, RigidBodyComponent)> = vec![
        (
            "ground",
            Transform::default(),
            RigidBodyComponent::fixed(Collider::cuboid(Vec3::new(20.0, 0.5, 20.0))),
        ),
        (
            "ramp",
            Transform::from_position(Vec3::new(3.0, 1.0, 0.0)),
            RigidBodyComponent::fixed(Collider::mesh([MeshBuffers::cube()])),
        ),
        (
            "crate",
            Transform::from_position(Vec3::new(0.0, 6.0, 0.0)),
            RigidBodyComponent::dynamic(5.0, Collider::cuboid(Vec3::splat(0.5))),
        ),
        (
            "ball",
            Transform::from_position(Vec3::new(0.2, 9.0, 0.1)),
            RigidBodyComponent::dynamic(1.0, Collider::sphere(0.4)),
        ),
    ];

    let mut tracked = Vec::new();
    for (name, transform, component) in scene {
        let entity = world.spawn((transform, component));

        // Split borrow: the component is mutated (shape cache), the
        // transform is only read
        let mut query = world
            .query_one::<(&Transform, &mut RigidBodyComponent)>(entity)
            .expect("entity was just spawned");
        let (transform, component) = query.get().expect("components were just inserted");

        match physics.add_rigid_body(entity, component, transform, transform.scale) {
            Some(body) => tracked.push(Tracked { name, entity, body }),
            None => log::warn!("{name}: no collision shape, skipping"),
        }
    }

    log::info!(
        "World running with {} bodies, {} shapes, {} meshes",
        physics.body_count(),
        physics.shape_count(),
        physics.mesh_count()
    );

    // Fixed-step session: 4 simulated seconds at 60 Hz
    let mut time = Time::new();
    let dt = 1.0 / 60.0;
    let mut debug_lines = DebugLines::new();

    for frame in 0..240 {
        time.update();
        physics.pre_update(dt);
        physics.update(dt);
        physics.post_update(dt);

        if frame % 60 == 0 {
            for t in &tracked {
                if let Some((position, _)) = physics.body_transform(t.body) {
                    log::info!("[t={frame:>3}] {:<6} at {position:?}", t.name);
                }
            }
            debug_lines.clear();
            physics.draw_debug(&mut debug_lines);
            log::debug!("debug draw: {} lines", debug_lines.line_count());
        }
    }

    log::info!(
        "Simulated {} frames in {:.2?} wall time",
        time.frame_count(),
        time.elapsed()
    );

    // Tear down: dynamic bodies own their shapes exclusively here, the
    // rest goes with the world
    for t in &tracked {
        if world
            .get::<&RigidBodyComponent>(t.entity)
            .map(|c| c.motion == MotionType::Dynamic)
            .unwrap_or(false)
        {
            let shape = physics.collision_shape_of(t.body);
            physics.delete_rigid_body(t.body, shape);
        }
    }
    physics.on_stop();
    physics.clean_up();

    log::info!("Physics demo finished");
}
