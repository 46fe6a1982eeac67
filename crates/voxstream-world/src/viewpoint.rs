use glam::Vec3;

/// Something whose world position the streaming pass follows.
pub trait Viewpoint {
    /// Current world position, or `None` if it has none right now
    /// (e.g. a despawned entity).
    fn position(&self) -> Option<Vec3>;
}

impl Viewpoint for Vec3 {
    fn position(&self) -> Option<Vec3> {
        Some(*self)
    }
}

impl Viewpoint for Option<Vec3> {
    fn position(&self) -> Option<Vec3> {
        *self
    }
}

/// Adapts a closure into a [`Viewpoint`].
pub struct FnViewpoint<F>(pub F);

impl<F> Viewpoint for FnViewpoint<F>
where
    F: Fn() -> Option<Vec3>,
{
    fn position(&self) -> Option<Vec3> {
        (self.0)()
    }
}

/// First position from `tracked`, falling back to `primary`.
pub fn resolve(
    tracked: Option<&dyn Viewpoint>,
    primary: Option<&dyn Viewpoint>,
) -> Option<Vec3> {
    tracked
        .and_then(|v| v.position())
        .or_else(|| primary.and_then(|v| v.position()))
}
