use std::collections::HashMap;
use std::fmt;

use glam::Vec3;

use crate::mesher::MeshBuffers;

/// Opaque id of a presentation object owned by a [`Presentation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The layer that turns geometry buffers into displayable objects.
/// Called from the main loop only.
pub trait Presentation {
    /// Create an object at a chunk's world origin. `None` means the
    /// resource is unavailable right now.
    fn create(&mut self, origin: Vec3, block_size: f32) -> Option<HandleId>;

    /// Replace the object's geometry. Empty buffers are valid.
    fn set_geometry(&mut self, handle: HandleId, mesh: &MeshBuffers);

    fn destroy(&mut self, handle: HandleId);

    fn is_live(&self, handle: HandleId) -> bool;
}

/// What a [`HeadlessPresentation`] remembers about one object.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessObject {
    pub origin: Vec3,
    pub block_size: f32,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Number of `set_geometry` calls received.
    pub geometry_updates: u32,
}

/// In-memory presentation registry for tests and headless runs.
#[derive(Debug, Default)]
pub struct HeadlessPresentation {
    objects: HashMap<HandleId, HeadlessObject>,
    next_id: u64,
    fail_create: bool,
    created: u64,
    destroyed: u64,
}

impl HeadlessPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create` fail until reset.
    pub fn set_fail_create(&mut self, fail: bool) {
        self.fail_create = fail;
    }

    pub fn object(&self, handle: HandleId) -> Option<&HeadlessObject> {
        self.objects.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    pub fn total_triangles(&self) -> usize {
        self.objects.values().map(|o| o.triangle_count).sum()
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

impl Presentation for HeadlessPresentation {
    fn create(&mut self, origin: Vec3, block_size: f32) -> Option<HandleId> {
        if self.fail_create {
            return None;
        }
        self.next_id += 1;
        let handle = HandleId(self.next_id);
        self.objects.insert(
            handle,
            HeadlessObject {
                origin,
                block_size,
                vertex_count: 0,
                triangle_count: 0,
                geometry_updates: 0,
            },
        );
        self.created += 1;
        Some(handle)
    }

    fn set_geometry(&mut self, handle: HandleId, mesh: &MeshBuffers) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.vertex_count = mesh.vertices.len();
            object.triangle_count = mesh.triangle_count();
            object.geometry_updates += 1;
        }
    }

    fn destroy(&mut self, handle: HandleId) {
        if self.objects.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn is_live(&self, handle: HandleId) -> bool {
        self.objects.contains_key(&handle)
    }
}
