pub mod rigid_body;

pub use rigid_body::RigidBody;

slotmap::new_key_type! {
    /// Generation-checked handle to a body owned by a `PhysicsWorld`.
    ///
    /// A handle outlives its body safely: once the body is destroyed every
    /// lookup through the handle reports it as stale.
    pub struct BodyHandle;
}
