use crate::collision::Manifold;
use crate::common::Material;
use crate::math::{Vec2, EPSILON};
use crate::objects::RigidBody;

/// Prepares a manifold for the solver: combines the two materials and drops
/// restitution for resting contacts, whose relative speed is no more than
/// what gravity adds in one step.
pub fn initialize(manifold: &mut Manifold, body_a: &RigidBody, body_b: &RigidBody, gravity: Vec2, dt: f64) {
    manifold.set_material(Material::combine(&body_a.material, &body_b.material));

    let resting_threshold = (gravity * dt).magnitude_squared() + EPSILON;
    let contact = manifold.contact;
    for &point in contact.points() {
        let rv = relative_velocity(body_a, body_b, point);
        if rv.magnitude_squared() < resting_threshold {
            manifold.restitution = 0.0;
        }
    }
}

/// One sequential-impulse pass over the manifold's contact points, with
/// Coulomb friction.
pub fn apply_impulse(manifold: &Manifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
    let inv_mass_total = body_a.inv_mass() + body_b.inv_mass();
    if inv_mass_total.abs() <= EPSILON {
        return;
    }

    let normal = manifold.normal();
    let count = manifold.contacts().len() as f64;

    for &point in manifold.contacts() {
        let ra = point - body_a.position;
        let rb = point - body_b.position;

        let rv = relative_velocity(body_a, body_b, point);
        let contact_velocity = rv.dot(normal);
        // Already separating
        if contact_velocity > 0.0 {
            continue;
        }

        let ra_cross_n = ra.cross(normal);
        let rb_cross_n = rb.cross(normal);
        let inv_mass_sum = inv_mass_total
            + ra_cross_n * ra_cross_n * body_a.inv_inertia()
            + rb_cross_n * rb_cross_n * body_b.inv_inertia();

        let impulse = -(1.0 + manifold.restitution) * contact_velocity / inv_mass_sum / count;
        let impulse_v = normal * impulse;
        apply_body_impulse(body_a, -impulse_v, ra);
        apply_body_impulse(body_b, impulse_v, rb);

        let rv = relative_velocity(body_a, body_b, point);
        let tangent = (rv - normal * rv.dot(normal)).normalize();
        let impulse_tangent = -rv.dot(tangent) / inv_mass_sum / count;
        if impulse_tangent.abs() <= EPSILON {
            continue;
        }

        let tangent_impulse = if impulse_tangent.abs() < impulse * manifold.static_friction {
            tangent * impulse_tangent
        } else {
            tangent * (-impulse * manifold.dynamic_friction)
        };
        apply_body_impulse(body_a, -tangent_impulse, ra);
        apply_body_impulse(body_b, tangent_impulse, rb);
    }
}

/// Pushes the bodies apart along the normal by a fraction of the
/// penetration beyond `allowance`, split by inverse mass.
pub fn correct_positions(
    manifold: &Manifold,
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
    allowance: f64,
    fraction: f64,
) {
    let inv_mass_total = body_a.inv_mass() + body_b.inv_mass();
    if inv_mass_total == 0.0 {
        return;
    }

    let depth = (manifold.penetration() - allowance).max(0.0);
    let correction = manifold.normal() * (depth / inv_mass_total * fraction);

    if body_a.enabled {
        body_a.position -= correction * body_a.inv_mass();
    }
    if body_b.enabled {
        body_b.position += correction * body_b.inv_mass();
    }
}

fn relative_velocity(body_a: &RigidBody, body_b: &RigidBody, point: Vec2) -> Vec2 {
    body_b.velocity_at(point) - body_a.velocity_at(point)
}

fn apply_body_impulse(body: &mut RigidBody, impulse: Vec2, contact_vector: Vec2) {
    if !body.enabled {
        return;
    }
    body.linear_velocity += impulse * body.inv_mass();
    if !body.freeze_orientation {
        body.angular_velocity += body.inv_inertia() * contact_vector.cross(impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{collide, Contact};
    use crate::objects::BodyHandle;
    use slotmap::SlotMap;
    const EPSILON: f64 = 1e-9;

    fn handles() -> (BodyHandle, BodyHandle) {
        let mut keys: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        (keys.insert(()), keys.insert(()))
    }

    fn manifold_for(a: &RigidBody, b: &RigidBody) -> Manifold {
        let (ha, hb) = handles();
        Manifold::new(ha, hb, collide(a, b).unwrap())
    }

    #[test]
    fn test_initialize_combines_materials() {
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.5, 0.0), 1.0, 1.0).unwrap();
        a.material = Material::new(0.9, 0.4, 0.8);
        b.material = Material::new(0.1, 0.1, 0.2);
        b.linear_velocity = Vec2::new(-5.0, 0.0);

        let mut m = manifold_for(&a, &b);
        initialize(&mut m, &a, &b, Vec2::new(0.0, 9.81), 1.0 / 60.0);

        assert!((m.restitution - 0.4).abs() < EPSILON);
        assert!((m.static_friction - 0.3).abs() < EPSILON);
        assert!((m.dynamic_friction - 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_initialize_resting_contact_drops_restitution() {
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.5, 0.0), 1.0, 1.0).unwrap();
        a.material.restitution = 1.0;
        b.material.restitution = 1.0;

        let mut m = manifold_for(&a, &b);
        initialize(&mut m, &a, &b, Vec2::new(0.0, 9.81), 1.0 / 60.0);
        assert_eq!(m.restitution, 0.0);
    }

    #[test]
    fn test_apply_impulse_conserves_momentum() {
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.5, 0.0), 1.0, 1.0).unwrap();
        a.linear_velocity = Vec2::new(3.0, 0.0);
        b.linear_velocity = Vec2::new(-1.0, 0.0);

        let mut m = manifold_for(&a, &b);
        initialize(&mut m, &a, &b, Vec2::ZERO, 1.0 / 60.0);
        apply_impulse(&m, &mut a, &mut b);

        // Perfectly inelastic head-on collision of equal masses
        assert!((a.linear_velocity.x - 1.0).abs() < EPSILON);
        assert!((b.linear_velocity.x - 1.0).abs() < EPSILON);
        let momentum = a.mass() * a.linear_velocity.x + b.mass() * b.linear_velocity.x;
        assert!((momentum - 2.0 * a.mass()).abs() < 1e-6);
    }

    #[test]
    fn test_apply_impulse_elastic() {
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.5, 0.0), 1.0, 1.0).unwrap();
        a.material.restitution = 1.0;
        b.material.restitution = 1.0;
        a.linear_velocity = Vec2::new(2.0, 0.0);

        let mut m = manifold_for(&a, &b);
        initialize(&mut m, &a, &b, Vec2::ZERO, 1.0 / 60.0);
        apply_impulse(&m, &mut a, &mut b);

        // Equal masses swap velocities
        assert!(a.linear_velocity.x.abs() < EPSILON);
        assert!((b.linear_velocity.x - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_apply_impulse_skips_separating_bodies() {
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.5, 0.0), 1.0, 1.0).unwrap();
        a.linear_velocity = Vec2::new(-1.0, 0.0);
        b.linear_velocity = Vec2::new(1.0, 0.0);

        let m = manifold_for(&a, &b);
        apply_impulse(&m, &mut a, &mut b);
        assert_eq!(a.linear_velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.linear_velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_apply_impulse_static_body_unmoved() {
        let mut floor = RigidBody::new_rectangle(Vec2::new(0.0, 1.0), 20.0, 2.0, 0.0).unwrap();
        let mut ball = RigidBody::new_circle(Vec2::new(0.0, -0.9), 1.0, 1.0).unwrap();
        ball.linear_velocity = Vec2::new(0.0, 4.0);

        let mut m = manifold_for(&floor, &ball);
        initialize(&mut m, &floor, &ball, Vec2::ZERO, 1.0 / 60.0);
        apply_impulse(&m, &mut floor, &mut ball);

        assert_eq!(floor.linear_velocity, Vec2::ZERO);
        assert_eq!(floor.angular_velocity, 0.0);
        assert!(ball.linear_velocity.y.abs() < EPSILON);
    }

    #[test]
    fn test_friction_slows_sliding_body() {
        let mut floor = RigidBody::new_rectangle(Vec2::new(0.0, 1.0), 20.0, 2.0, 0.0).unwrap();
        let mut block = RigidBody::new_rectangle(Vec2::new(0.0, -0.45), 1.0, 1.0, 1.0).unwrap();
        block.linear_velocity = Vec2::new(2.0, 1.0);

        let mut m = manifold_for(&floor, &block);
        initialize(&mut m, &floor, &block, Vec2::ZERO, 1.0 / 60.0);
        apply_impulse(&m, &mut floor, &mut block);

        assert!(block.linear_velocity.x < 2.0);
        assert!(block.linear_velocity.x > 0.0);
        assert!(block.linear_velocity.y < 1.0);
    }

    #[test]
    fn test_correct_positions_splits_by_inverse_mass() {
        let (ha, hb) = handles();
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.75, 0.0), 1.0, 1.0).unwrap();
        let m = Manifold::new(ha, hb, Contact::single(Vec2::new(1.0, 0.0), 0.25, Vec2::new(1.0, 0.0)));

        correct_positions(&m, &mut a, &mut b, 0.05, 0.4);

        // 0.2 excess * 0.4 split evenly
        assert!((a.position.x - -0.04).abs() < EPSILON);
        assert!((b.position.x - 1.79).abs() < EPSILON);
    }

    #[test]
    fn test_correct_positions_within_allowance() {
        let (ha, hb) = handles();
        let mut a = RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap();
        let mut b = RigidBody::new_circle(Vec2::new(1.97, 0.0), 1.0, 1.0).unwrap();
        let m = Manifold::new(ha, hb, Contact::single(Vec2::new(1.0, 0.0), 0.03, Vec2::new(1.0, 0.0)));

        correct_positions(&m, &mut a, &mut b, 0.05, 0.4);
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(b.position, Vec2::new(1.97, 0.0));
    }

    #[test]
    fn test_correct_positions_static_side() {
        let (ha, hb) = handles();
        let mut floor = RigidBody::new_rectangle(Vec2::ZERO, 10.0, 1.0, 0.0).unwrap();
        let mut ball = RigidBody::new_circle(Vec2::new(0.0, -1.0), 1.0, 1.0).unwrap();
        let m = Manifold::new(ha, hb, Contact::single(Vec2::new(0.0, -1.0), 0.55, Vec2::ZERO));

        correct_positions(&m, &mut floor, &mut ball, 0.05, 0.4);
        assert_eq!(floor.position, Vec2::ZERO);
        assert!((ball.position.y - -1.2).abs() < EPSILON);
    }
}
