//! Physics world lifecycle and rigid-body management, built on rapier3d
//!
//! One `PhysicsWorld` per simulation session. Construction sets up the
//! world-level singletons (pipelines, integration parameters, shape store);
//! `start` brings up the simulation state; `clean_up` tears the state and
//! every registered shape/mesh down while the singletons survive until the
//! value is dropped. All mutation goes through `&mut self`: one logical
//! update thread, no internal locking.

use glam::{Quat, Vec3};
use hecs::Entity;
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::pipeline::{DebugRenderBackend, DebugRenderMode, DebugRenderPipeline, DebugRenderStyle};
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;

use crate::ecs::{MotionType, RigidBodyComponent, Transform};
use crate::physics::shape::{ShapeHandle, ShapeStore};

/// Fixed number of solver sub-steps per `pre_update`; decouples variable
/// frame time from solver stability
const SUBSTEPS: u32 = 15;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Convert glam Quat to a rapier rotation
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert a rapier rotation to glam Quat
fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn transform_to_isometry(transform: &Transform) -> Isometry<f32> {
    Isometry::from_parts(
        Translation3::new(
            transform.position.x,
            transform.position.y,
            transform.position.z,
        ),
        quat_to_rapier(transform.rotation),
    )
}

/// What a native body is bound to on the engine side
struct BodyBinding {
    entity: Entity,
    shape: ShapeHandle,
}

/// Live simulation state, present between `start` and `clean_up`
struct WorldState {
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl WorldState {
    fn new() -> Self {
        Self {
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }
}

/// Physics integration module: owns the dynamics world and the mapping
/// between engine components and native physics objects
pub struct PhysicsWorld {
    /// Gravity vector applied to every dynamic body
    pub gravity: Vec3,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    debug_pipeline: DebugRenderPipeline,
    /// Debug-draw mode applied on `on_play`
    debug_mode: DebugRenderMode,
    shapes: ShapeStore,
    bindings: FxHashMap<RigidBodyHandle, BodyBinding>,
    state: Option<WorldState>,
}

impl PhysicsWorld {
    /// Construct the world-level singletons. The simulation itself does not
    /// exist until [`start`](Self::start).
    #[must_use]
    pub fn new() -> Self {
        log::info!("Physics module initialized");
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            debug_pipeline: DebugRenderPipeline::new(
                DebugRenderStyle::default(),
                DebugRenderMode::empty(),
            ),
            debug_mode: DebugRenderMode::COLLIDER_SHAPES,
            shapes: ShapeStore::new(),
            bindings: FxHashMap::default(),
            state: None,
        }
    }

    /// Bring up the simulation state for a session. Debug draw starts
    /// disabled regardless of the configured mode.
    pub fn start(&mut self) {
        if self.state.is_some() {
            log::warn!("physics world already started, ignoring");
            return;
        }
        self.state = Some(WorldState::new());
        self.debug_pipeline.mode = DebugRenderMode::empty();
        log::info!("Physics world started (gravity {:?})", self.gravity);
    }

    /// Whether the simulation state exists
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// Enable debug draw with the configured mode
    pub fn on_play(&mut self) {
        self.debug_pipeline.mode = self.debug_mode;
    }

    /// Disable debug draw; the world itself stays alive
    pub fn on_stop(&mut self) {
        self.debug_pipeline.mode = DebugRenderMode::empty();
    }

    /// Set the debug-draw mode applied on the next `on_play`
    pub fn set_debug_mode(&mut self, mode: DebugRenderMode) {
        self.debug_mode = mode;
    }

    /// Advance the simulation by `dt`, split into [`SUBSTEPS`] fixed
    /// sub-steps. Physics state is settled before `update`/`post_update`
    /// run, so dependent systems read consistent data within the frame.
    pub fn pre_update(&mut self, dt: f32) {
        let Some(state) = self.state.as_mut() else {
            log::warn!("pre_update called without a running physics world");
            return;
        };

        self.integration_parameters.dt = dt / SUBSTEPS as f32;
        let gravity = vector![self.gravity.x, self.gravity.y, self.gravity.z];

        for _ in 0..SUBSTEPS {
            self.pipeline.step(
                &gravity,
                &self.integration_parameters,
                &mut state.islands,
                &mut state.broad_phase,
                &mut state.narrow_phase,
                &mut state.bodies,
                &mut state.colliders,
                &mut state.impulse_joints,
                &mut state.multibody_joints,
                &mut state.ccd_solver,
                Some(&mut state.query_pipeline),
                &(),
                &(),
            );
        }
    }

    /// Reserved for gameplay-state synchronization after the solver ran
    pub fn update(&mut self, _dt: f32) {}

    /// Reserved for late synchronization before rendering reads physics
    pub fn post_update(&mut self, _dt: f32) {}

    /// Create a rigid body for a component and insert it into the world.
    ///
    /// Mass participates only for dynamic bodies; static and kinematic
    /// bodies get exactly zero mass and inertia. The collider's shape is
    /// reused when already baked at `scale`, otherwise the factory builds
    /// (or shares) one. Returns `None` when no shape could be built or the
    /// world is not running; no body enters the world without a shape.
    pub fn add_rigid_body(
        &mut self,
        entity: Entity,
        component: &mut RigidBodyComponent,
        transform: &Transform,
        scale: Vec3,
    ) -> Option<RigidBodyHandle> {
        if self.state.is_none() {
            log::warn!("add_rigid_body called without a running physics world");
            return None;
        }

        let mass = if component.motion == MotionType::Dynamic {
            component.mass
        } else {
            0.0
        };

        let shape_handle = self
            .shapes
            .create_collision_shape(&mut component.collider, scale)?;
        let entry = self.shapes.shape(shape_handle)?;

        // Local inertia from mass and baked geometry; zero for non-dynamic
        // bodies by the mass-zero convention
        let mass_properties = if mass != 0.0 {
            let unit = entry.shape.mass_properties(1.0);
            let unit_mass = unit.mass();
            if unit_mass > 0.0 {
                MassProperties::new(
                    unit.local_com,
                    mass,
                    unit.principal_inertia() * (mass / unit_mass),
                )
            } else {
                MassProperties::new(Point::origin(), mass, Vector::zeros())
            }
        } else {
            MassProperties::new(Point::origin(), 0.0, Vector::zeros())
        };

        let builder = match component.motion {
            MotionType::Static => RigidBodyBuilder::fixed(),
            MotionType::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            MotionType::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = builder
            .position(transform_to_isometry(transform))
            .additional_mass_properties(mass_properties)
            .build();

        let state = self.state.as_mut()?;
        let body_handle = state.bodies.insert(body);

        // Mass comes from the explicit properties above, not the collider
        let collider = ColliderBuilder::new(entry.shape.clone()).density(0.0).build();
        state
            .colliders
            .insert_with_parent(collider, body_handle, &mut state.bodies);

        let handle = RigidBodyHandle(body_handle);
        self.bindings.insert(
            handle,
            BodyBinding {
                entity,
                shape: shape_handle,
            },
        );
        Some(handle)
    }

    /// Remove a body from the world. If `shape` is supplied the shape is
    /// released from the registry as well; without it any shared shape is
    /// left untouched. Stale handles are tolerated no-ops.
    pub fn delete_rigid_body(&mut self, body: RigidBodyHandle, shape: Option<ShapeHandle>) {
        if let Some(state) = self.state.as_mut() {
            if state
                .bodies
                .remove(
                    body.0,
                    &mut state.islands,
                    &mut state.colliders,
                    &mut state.impulse_joints,
                    &mut state.multibody_joints,
                    true,
                )
                .is_some()
            {
                self.bindings.remove(&body);
            } else {
                log::debug!("delete of unknown rigid body {body:?}, ignoring");
            }
        }

        if let Some(shape) = shape {
            self.shapes.delete_shape(shape);
        }
    }

    /// The collision shape a body was created with
    #[must_use]
    pub fn collision_shape_of(&self, body: RigidBodyHandle) -> Option<ShapeHandle> {
        self.bindings.get(&body).map(|binding| binding.shape)
    }

    /// The entity a body belongs to
    #[must_use]
    pub fn entity_of(&self, body: RigidBodyHandle) -> Option<Entity> {
        self.bindings.get(&body).map(|binding| binding.entity)
    }

    /// The scale a shape was baked with; identity for stale handles
    #[must_use]
    pub fn shape_scale(&self, shape: ShapeHandle) -> Vec3 {
        self.shapes.scale_of(shape)
    }

    /// Current position and rotation of a body, for transform sync
    #[must_use]
    pub fn body_transform(&self, body: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let state = self.state.as_ref()?;
        let rb = state.bodies.get(body.0)?;
        let pos = rb.translation();
        Some((
            Vec3::new(pos.x, pos.y, pos.z),
            rapier_to_quat(rb.rotation()),
        ))
    }

    /// Local inertia of a body, zero for static/kinematic bodies
    #[must_use]
    pub fn body_inertia(&self, body: RigidBodyHandle) -> Option<Vec3> {
        let state = self.state.as_ref()?;
        let rb = state.bodies.get(body.0)?;
        let inertia = rb.mass_properties().local_mprops.principal_inertia();
        Some(Vec3::new(inertia.x, inertia.y, inertia.z))
    }

    /// Number of bodies currently in the world
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.bodies.len())
    }

    /// Number of registered collision shapes
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.shape_count()
    }

    /// Number of registered triangle meshes
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.shapes.mesh_count()
    }

    /// Access to the shape store, for factory use outside body creation
    pub fn shapes_mut(&mut self) -> &mut ShapeStore {
        &mut self.shapes
    }

    /// Render the physics world into a debug backend. Does nothing when
    /// debug draw is disabled or the world is not running.
    ///
    /// Cost is proportional to the number of active shapes; keep it off
    /// outside debugging sessions.
    pub fn draw_debug(&mut self, backend: &mut impl DebugRenderBackend) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        self.debug_pipeline.render(
            backend,
            &state.bodies,
            &state.colliders,
            &state.impulse_joints,
            &state.multibody_joints,
            &state.narrow_phase,
        );
    }

    /// Tear down the session: every registered shape and mesh is released
    /// and the simulation state dropped. The singletons survive; dropping
    /// the value afterwards is safe and final.
    pub fn clean_up(&mut self) {
        log::info!(
            "Cleaning up physics world: {} bodies, {} shapes, {} meshes",
            self.body_count(),
            self.shapes.shape_count(),
            self.shapes.mesh_count()
        );
        self.shapes.clear();
        self.bindings.clear();
        self.state = None;
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
