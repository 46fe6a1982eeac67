use glam::{IVec3, Vec2, Vec3, Vec4};
use voxstream_core::constants::{CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use voxstream_core::{BlockId, ChunkData};

/// Geometry produced for one chunk, in world units relative to the chunk
/// origin. All per-vertex buffers have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub colors: Vec<Vec4>,
    pub tangents: Vec<Vec3>,
}

impl MeshBuffers {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Turns chunk data into geometry. Runs on build workers, so it must be
/// a pure function of its inputs.
pub trait Mesher: Send + Sync {
    fn build_mesh(&self, chunk: &ChunkData, block_size: f32) -> MeshBuffers;
}

/// One quad per solid face that borders a non-solid cell. Faces on the
/// chunk border are always emitted.
///
/// Cells are centered on their integer coordinates, matching the centered
/// mapping used for hit-point edits. Front faces wind counter-clockwise
/// in world space (Z-up).
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveMesher;

const AXES: [IVec3; 3] = [IVec3::X, IVec3::Y, IVec3::Z];

const CORNER_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Chunk space is Y-up; world space is Z-up.
fn to_world(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

fn in_chunk(c: IVec3) -> bool {
    c.x >= 0
        && c.x < CHUNK_SIZE_X as i32
        && c.y >= 0
        && c.y < CHUNK_SIZE_Y as i32
        && c.z >= 0
        && c.z < CHUNK_SIZE_Z as i32
}

pub fn block_color(block: BlockId) -> Vec4 {
    match block {
        BlockId::Air => Vec4::ZERO,
        BlockId::Dirt => Vec4::new(0.45, 0.30, 0.18, 1.0),
        BlockId::Grass => Vec4::new(0.30, 0.60, 0.20, 1.0),
        BlockId::Stone => Vec4::new(0.50, 0.50, 0.50, 1.0),
        BlockId::Sand => Vec4::new(0.85, 0.80, 0.55, 1.0),
        BlockId::Water => Vec4::new(0.20, 0.40, 0.80, 0.6),
    }
}

impl NaiveMesher {
    fn push_face(
        mesh: &mut MeshBuffers,
        cell: IVec3,
        axis: usize,
        positive: bool,
        block_size: f32,
        color: Vec4,
    ) {
        let n = AXES[axis];
        let u = AXES[(axis + 1) % 3].as_vec3();
        let v = AXES[(axis + 2) % 3].as_vec3();

        let mut corner = cell.as_vec3() - Vec3::splat(0.5);
        if positive {
            corner += n.as_vec3();
        }
        let corners = [corner, corner + u, corner + u + v, corner + v];

        let normal = to_world(if positive { n.as_vec3() } else { -n.as_vec3() });
        let tangent = to_world(u);

        let base = mesh.vertices.len() as u32;
        for (p, uv) in corners.iter().zip(CORNER_UVS) {
            mesh.vertices.push(to_world(*p) * block_size);
            mesh.normals.push(normal);
            mesh.uvs.push(uv);
            mesh.colors.push(color);
            mesh.tangents.push(tangent);
        }

        // The Y/Z swap mirrors handedness, so u x v points against +n in world space.
        if positive {
            mesh.indices
                .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        } else {
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

impl Mesher for NaiveMesher {
    fn build_mesh(&self, chunk: &ChunkData, block_size: f32) -> MeshBuffers {
        let mut mesh = MeshBuffers::default();

        for y in 0..CHUNK_SIZE_Y as i32 {
            for z in 0..CHUNK_SIZE_Z as i32 {
                for x in 0..CHUNK_SIZE_X as i32 {
                    let cell = IVec3::new(x, y, z);
                    let Some(block) = chunk.get(cell).filter(|b| b.is_solid()) else {
                        continue;
                    };
                    let color = block_color(block);

                    for (axis, dir) in AXES.iter().enumerate() {
                        for positive in [false, true] {
                            let neighbor = if positive { cell + *dir } else { cell - *dir };
                            let exposed = !in_chunk(neighbor)
                                || !chunk.get(neighbor).is_some_and(|b| b.is_solid());
                            if exposed {
                                Self::push_face(&mut mesh, cell, axis, positive, block_size, color);
                            }
                        }
                    }
                }
            }
        }

        mesh
    }
}
