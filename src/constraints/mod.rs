use crate::objects::{BodyHandle, RigidBody};
use slotmap::SlotMap;

pub mod contact;

pub use contact::{apply_impulse, correct_positions, initialize};

/// Mutable references to two distinct live bodies. `None` if either handle is
/// stale or both handles name the same body.
pub(crate) fn body_pair_mut(
    bodies: &mut SlotMap<BodyHandle, RigidBody>,
    handle_a: BodyHandle,
    handle_b: BodyHandle,
) -> Option<(&mut RigidBody, &mut RigidBody)> {
    let [body_a, body_b] = bodies.get_disjoint_mut([handle_a, handle_b])?;
    Some((body_a, body_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_body_pair_mut() {
        let mut bodies = SlotMap::with_key();
        let a = bodies.insert(RigidBody::new_circle(Vec2::ZERO, 1.0, 1.0).unwrap());
        let b = bodies.insert(RigidBody::new_circle(Vec2::new(5.0, 0.0), 1.0, 1.0).unwrap());

        let (body_a, body_b) = body_pair_mut(&mut bodies, a, b).unwrap();
        body_a.position.x = -1.0;
        body_b.position.x = 6.0;
        assert_eq!(bodies[a].position.x, -1.0);
        assert_eq!(bodies[b].position.x, 6.0);

        assert!(body_pair_mut(&mut bodies, a, a).is_none());
        bodies.remove(b);
        assert!(body_pair_mut(&mut bodies, a, b).is_none());
    }
}
