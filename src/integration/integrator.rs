use crate::math::Vec2;
use crate::objects::rigid_body::RigidBody;

/// Half-step velocity update from accumulated force, torque and gravity.
///
/// The step pipeline calls this twice per step (before the solver and after
/// the position update), giving a leapfrog scheme. Static and disabled bodies
/// are left untouched.
pub fn integrate_forces(body: &mut RigidBody, gravity: Vec2, dt: f64) {
    if body.inv_mass() == 0.0 || !body.enabled {
        return;
    }

    let half_dt = dt / 2.0;
    body.linear_velocity += body.force * (body.inv_mass() * half_dt);
    if body.use_gravity {
        body.linear_velocity += gravity * half_dt;
    }
    if !body.freeze_orientation {
        body.angular_velocity += body.torque * body.inv_inertia() * half_dt;
    }
}

/// Full-step position and orientation update followed by the second force
/// half-step.
pub fn integrate_velocity(body: &mut RigidBody, gravity: Vec2, dt: f64) {
    if !body.enabled || body.inv_mass() == 0.0 {
        return;
    }

    body.position += body.linear_velocity * dt;
    if !body.freeze_orientation {
        let orientation = wrap_angle(body.orientation() + body.angular_velocity * dt);
        body.set_rotation(orientation);
    }

    integrate_forces(body, gravity, dt);
}

/// Wraps an angle in radians to the range [-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}
