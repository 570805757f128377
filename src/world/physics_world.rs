use crate::collision::{collide, Manifold};
use crate::common::{Pcg32, PhysicsError, Result};
use crate::constraints::{self, body_pair_mut};
use crate::integration::{integrate_forces, integrate_velocity};
use crate::math::Vec2;
use crate::objects::{BodyHandle, RigidBody};
use crate::shapes::{Shape, ShapeKind};

use super::clock::{FrameClock, MonotonicClock};
use super::config::WorldConfig;

use log::{debug, info, trace, warn};
use slotmap::SlotMap;
use std::f64::consts::TAU;
use std::time::Duration;

/// Shatter pieces are shrunk around their barycenter so neighbours do not
/// start out overlapping.
const SHATTER_SHRINK: f64 = 0.95;

/// Counters from the most recent step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Body pairs that reached the narrow phase.
    pub pairs_tested: usize,
    /// Manifolds with at least one contact.
    pub manifolds: usize,
}

/// Owns every body and runs the fixed step pipeline.
///
/// Bodies are addressed by generation-checked [`BodyHandle`]s, or by their
/// position in insertion order for renderer-style enumeration. Insertion
/// order also fixes the pair order the solver visits, so identical call
/// sequences give identical results.
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, RigidBody>,
    order: Vec<BodyHandle>,
    manifolds: Vec<Manifold>,
    config: WorldConfig,
    rng: Pcg32,
    clock: Box<dyn FrameClock>,
    last_tick: Duration,
    accumulator: f64,
    steps: u64,
    stats: StepStats,
}

impl PhysicsWorld {
    /// Creates an empty world with the default configuration and a
    /// monotonic wall clock.
    pub fn new() -> Self {
        Self::build(WorldConfig::default(), Box::new(MonotonicClock::new()))
    }

    /// Creates an empty world after validating `config`.
    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Box::new(MonotonicClock::new())))
    }

    /// Replaces the time source used by [`update`](Self::update).
    pub fn with_clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.last_tick = clock.now();
        self.clock = Box::new(clock);
        self.accumulator = 0.0;
        self
    }

    fn build(config: WorldConfig, clock: Box<dyn FrameClock>) -> Self {
        info!(
            "physics world initialized (gravity {:?}, time step {:.4}s, {} solver iterations)",
            config.gravity, config.time_step, config.solver_iterations
        );
        Self {
            bodies: SlotMap::with_capacity_and_key(config.max_bodies),
            order: Vec::with_capacity(config.max_bodies),
            manifolds: Vec::with_capacity(config.max_manifolds),
            rng: Pcg32::new(config.polygon_seed),
            last_tick: clock.now(),
            clock,
            config,
            accumulator: 0.0,
            steps: 0,
            stats: StepStats::default(),
        }
    }

    /// Drops every body and manifold. Configuration is kept and the polygon
    /// facing generator is reseeded. Handles issued before the reset are stale.
    pub fn reset(&mut self) {
        info!("physics world reset ({} bodies dropped)", self.order.len());
        self.bodies.clear();
        self.order.clear();
        self.manifolds.clear();
        self.rng = Pcg32::new(self.config.polygon_seed);
        self.last_tick = self.clock.now();
        self.accumulator = 0.0;
        self.steps = 0;
        self.stats = StepStats::default();
    }

    /// Tears the world down.
    pub fn close(self) {
        info!(
            "physics world closed after {} steps ({} bodies)",
            self.steps,
            self.order.len()
        );
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn time_step(&self) -> f64 {
        self.config.time_step
    }

    /// Sets the fixed step length in seconds.
    pub fn set_time_step(&mut self, seconds: f64) -> Result<()> {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_step must be positive, got {seconds}"
            )));
        }
        self.config.time_step = seconds;
        Ok(())
    }

    pub fn set_solver_iterations(&mut self, iterations: usize) -> Result<()> {
        if iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be at least 1".into(),
            ));
        }
        self.config.solver_iterations = iterations;
        Ok(())
    }

    pub fn create_circle(&mut self, position: Vec2, radius: f64, density: f64) -> Result<BodyHandle> {
        let body = RigidBody::new_circle(position, radius, density)?;
        Ok(self.add_body(body))
    }

    pub fn create_rectangle(
        &mut self,
        position: Vec2,
        width: f64,
        height: f64,
        density: f64,
    ) -> Result<BodyHandle> {
        let body = RigidBody::new_rectangle(position, width, height, density)?;
        Ok(self.add_body(body))
    }

    /// Regular polygon with a facing drawn from the world's seeded generator.
    pub fn create_polygon(
        &mut self,
        position: Vec2,
        radius: f64,
        sides: usize,
        density: f64,
    ) -> Result<BodyHandle> {
        let facing = self.rng.next_f64() * TAU;
        let body = RigidBody::new_polygon(position, radius, sides, density, facing)?;
        Ok(self.add_body(body))
    }

    /// Convex polygon from an outline relative to `origin`.
    pub fn create_from_vertices(
        &mut self,
        origin: Vec2,
        vertices: Vec<Vec2>,
        density: f64,
    ) -> Result<BodyHandle> {
        let body = RigidBody::from_vertices(origin, vertices, density)?;
        Ok(self.add_body(body))
    }

    /// Adds a prebuilt body and returns its handle.
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let kind = body.kind();
        let position = body.position;
        let handle = self.bodies.insert(body);
        self.order.push(handle);
        debug!(
            "created {:?} body {:?} at {:?} (index {})",
            kind,
            handle,
            position,
            self.order.len() - 1
        );
        if self.order.len() > self.config.max_bodies {
            warn!(
                "body count {} exceeds capacity hint {}",
                self.order.len(),
                self.config.max_bodies
            );
        }
        handle
    }

    /// Removes a body from the world and hands it back. Later bodies move
    /// down one index.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        let body = self.bodies.remove(handle).ok_or(PhysicsError::StaleHandle)?;
        self.order.retain(|&h| h != handle);
        self.manifolds
            .retain(|m| m.body_a != handle && m.body_b != handle);
        debug!("destroyed body {:?} ({} remaining)", handle, self.order.len());
        Ok(body)
    }

    pub fn set_rotation(&mut self, handle: BodyHandle, radians: f64) -> Result<()> {
        self.body_mut(handle)?.set_rotation(radians);
        Ok(())
    }

    pub fn add_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<()> {
        self.body_mut(handle)?.apply_force(force);
        Ok(())
    }

    pub fn add_torque(&mut self, handle: BodyHandle, torque: f64) -> Result<()> {
        self.body_mut(handle)?.add_torque(torque);
        Ok(())
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.get(handle).ok_or(PhysicsError::StaleHandle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.get_mut(handle).ok_or(PhysicsError::StaleHandle)
    }

    pub fn handle_at(&self, index: usize) -> Result<BodyHandle> {
        self.order
            .get(index)
            .copied()
            .ok_or(PhysicsError::OutOfRange {
                index,
                len: self.order.len(),
            })
    }

    pub fn body_at(&self, index: usize) -> Result<&RigidBody> {
        let handle = self.handle_at(index)?;
        self.body(handle)
    }

    /// Live bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.order
            .iter()
            .filter_map(move |&h| self.bodies.get(h).map(|body| (h, body)))
    }

    pub fn handles(&self) -> &[BodyHandle] {
        &self.order
    }

    pub fn body_count(&self) -> usize {
        self.order.len()
    }

    pub fn shape_kind(&self, index: usize) -> Result<ShapeKind> {
        Ok(self.body_at(index)?.kind())
    }

    pub fn vertex_count(&self, index: usize) -> Result<usize> {
        Ok(self.body_at(index)?.shape.vertex_count())
    }

    /// World-space vertex `vertex` of a body's outline, rotation applied.
    pub fn shape_vertex(&self, handle: BodyHandle, vertex: usize) -> Result<Vec2> {
        self.body(handle)?.shape_vertex(vertex)
    }

    /// Manifolds produced by the last step.
    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds
    }

    pub fn last_step_stats(&self) -> StepStats {
        self.stats
    }

    /// Number of steps run since creation or the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advances the world by one fixed `time_step`.
    pub fn step(&mut self) {
        let dt = self.config.time_step;
        let gravity = self.config.gravity;

        self.manifolds.clear();
        for body in self.bodies.values_mut() {
            body.is_grounded = false;
        }

        let pairs_tested = self.detect_collisions();

        for body in self.bodies.values_mut() {
            integrate_forces(body, gravity, dt);
        }

        for manifold in &mut self.manifolds {
            if let (Some(a), Some(b)) = (self.bodies.get(manifold.body_a), self.bodies.get(manifold.body_b)) {
                constraints::initialize(manifold, a, b, gravity, dt);
            }
        }

        for _ in 0..self.config.solver_iterations {
            for manifold in &self.manifolds {
                if let Some((a, b)) = body_pair_mut(&mut self.bodies, manifold.body_a, manifold.body_b) {
                    constraints::apply_impulse(manifold, a, b);
                }
            }
        }

        for body in self.bodies.values_mut() {
            integrate_velocity(body, gravity, dt);
        }

        for manifold in &self.manifolds {
            if let Some((a, b)) = body_pair_mut(&mut self.bodies, manifold.body_a, manifold.body_b) {
                constraints::correct_positions(
                    manifold,
                    a,
                    b,
                    self.config.penetration_allowance,
                    self.config.penetration_correction,
                );
            }
        }

        for body in self.bodies.values_mut() {
            body.clear_accumulators();
        }

        self.steps += 1;
        self.stats = StepStats {
            pairs_tested,
            manifolds: self.manifolds.len(),
        };
        trace!(
            "step {}: {} bodies, {} pairs tested, {} manifolds",
            self.steps,
            self.order.len(),
            pairs_tested,
            self.manifolds.len()
        );
    }

    /// Narrow phase over every pair in insertion order. Circle/polygon pairs
    /// are reordered so the polygon comes first.
    fn detect_collisions(&mut self) -> usize {
        let mut pairs_tested = 0;
        let mut grounded = Vec::new();

        for (i, &first) in self.order.iter().enumerate() {
            for &second in &self.order[i + 1..] {
                let (Some(body_a), Some(body_b)) = (self.bodies.get(first), self.bodies.get(second)) else {
                    continue;
                };
                if body_a.is_static() && body_b.is_static() {
                    continue;
                }
                pairs_tested += 1;

                let (handle_a, handle_b, body_a, body_b) =
                    if body_a.kind() == ShapeKind::Circle && body_b.kind() == ShapeKind::Polygon {
                        (second, first, body_b, body_a)
                    } else {
                        (first, second, body_a, body_b)
                    };

                if let Some(contact) = collide(body_a, body_b) {
                    if contact.normal.y < 0.0 {
                        grounded.push(handle_b);
                    }
                    self.manifolds.push(Manifold::new(handle_a, handle_b, contact));
                }
            }
        }

        for handle in grounded {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.is_grounded = true;
            }
        }

        if self.manifolds.len() > self.config.max_manifolds {
            warn!(
                "manifold count {} exceeds capacity hint {}",
                self.manifolds.len(),
                self.config.max_manifolds
            );
        }
        pairs_tested
    }

    /// Reads the clock and runs as many fixed steps as the elapsed time
    /// covers. The remainder carries over to the next call.
    pub fn update(&mut self) -> usize {
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.last_tick);
        self.last_tick = now;
        self.accumulator += elapsed.as_secs_f64();

        let mut ran = 0;
        while self.accumulator >= self.config.time_step {
            self.step();
            self.accumulator -= self.config.time_step;
            ran += 1;
        }
        ran
    }

    /// Breaks a polygon body into one triangle per edge, fanned around
    /// `point`, and pushes every piece away from the old center with a force
    /// of magnitude `force`.
    ///
    /// Nothing happens (and an empty list is returned) for circles or when
    /// `point` is not strictly inside the polygon.
    pub fn shatter(&mut self, handle: BodyHandle, point: Vec2, force: f64) -> Result<Vec<BodyHandle>> {
        let body = self.body(handle)?;
        let polygon = match &body.shape {
            Shape::Polygon(polygon) => polygon,
            Shape::Circle(_) => return Ok(Vec::new()),
        };
        let local_point = polygon.transform().transpose() * (point - body.position);
        if !polygon.contains_local(local_point) {
            return Ok(Vec::new());
        }

        let outline = body.world_vertices();
        let mut pieces = Vec::with_capacity(outline.len());
        for (i, &a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            let barycenter = (a + b + point) / 3.0;
            let triangle = [a, b, point]
                .iter()
                .map(|&v| barycenter + (v - barycenter) * SHATTER_SHRINK)
                .collect();

            let mut piece = RigidBody::from_vertices(Vec2::ZERO, triangle, body.density())?;
            piece.material = body.material;
            piece.enabled = body.enabled;
            piece.use_gravity = body.use_gravity;
            piece.freeze_orientation = body.freeze_orientation;
            piece.linear_velocity = body.velocity_at(piece.position);
            piece.angular_velocity = body.angular_velocity;
            piece.apply_force((piece.position - body.position).normalize() * force);
            pieces.push(piece);
        }

        self.destroy_body(handle)?;
        let handles: Vec<BodyHandle> = pieces.into_iter().map(|piece| self.add_body(piece)).collect();
        debug!("shattered body {:?} into {} pieces", handle, handles.len());
        Ok(handles)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
