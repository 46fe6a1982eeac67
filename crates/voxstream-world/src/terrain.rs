use glam::IVec3;
use voxstream_core::constants::{CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use voxstream_core::{BlockId, ChunkData, ChunkKey};

/// Procedural baseline for a chunk. Runs on build workers and must be
/// deterministic: the same seed and key always produce the same grid.
pub trait Generator: Send + Sync {
    /// Fill `chunk` (all air on entry) with baseline blocks via
    /// [`ChunkData::set_baseline`].
    fn generate(&self, seed: i32, key: ChunkKey, chunk: &mut ChunkData);
}

/// Water fills every column up to this height.
const SEA_LEVEL: i32 = 20;

/// Dirt layers between the surface and stone.
const DIRT_DEPTH: i32 = 3;

/// Heightmap terrain from 3-octave 2D simplex noise.
///
/// Layers from the bottom: stone, a few cells of dirt, then grass on the
/// surface (sand on beaches and under water), water up to sea level,
/// and air above.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainGenerator;

impl TerrainGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Surface height of a world column, in cells.
    pub fn column_height(noise: &SimplexNoise, wx: i64, wz: i64) -> i32 {
        let x = wx as f64;
        let z = wz as f64;

        let scale = 0.015;
        let mut h = 0.0f64;
        h += noise.sample(x * scale, z * scale) * 10.0;
        h += noise.sample(x * scale * 2.0 + 100.0, z * scale * 2.0 + 100.0) * 4.0;
        h += noise.sample(x * scale * 4.0 + 200.0, z * scale * 4.0 + 200.0) * 2.0;

        let height = (SEA_LEVEL as f64 + 3.0 + h).round() as i32;
        height.clamp(1, CHUNK_SIZE_Y as i32 - 2)
    }

    fn block_for(y: i32, height: i32) -> BlockId {
        let beach = height <= SEA_LEVEL + 1;
        if y < height - DIRT_DEPTH {
            BlockId::Stone
        } else if y < height {
            BlockId::Dirt
        } else if y == height {
            if beach {
                BlockId::Sand
            } else {
                BlockId::Grass
            }
        } else if y <= SEA_LEVEL {
            BlockId::Water
        } else {
            BlockId::Air
        }
    }
}

impl Generator for TerrainGenerator {
    fn generate(&self, seed: i32, key: ChunkKey, chunk: &mut ChunkData) {
        let noise = SimplexNoise::new(seed as i64 as u64);
        let base_x = key.x as i64 * CHUNK_SIZE_X as i64;
        let base_z = key.z as i64 * CHUNK_SIZE_Z as i64;

        for lz in 0..CHUNK_SIZE_Z as i32 {
            for lx in 0..CHUNK_SIZE_X as i32 {
                let height = Self::column_height(&noise, base_x + lx as i64, base_z + lz as i64);
                for y in 0..CHUNK_SIZE_Y as i32 {
                    let block = Self::block_for(y, height);
                    if block != BlockId::Air {
                        chunk.set_baseline(IVec3::new(lx, y, lz), block);
                    }
                }
            }
        }
    }
}

/// Seeded 2D simplex noise.
#[derive(Clone)]
pub struct SimplexNoise {
    /// Permutation table (doubled for wrapping).
    perm: [u8; 512],
}

impl SimplexNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            perm: Self::build_permutation(seed),
        }
    }

    /// Returns a value in roughly [-1, 1].
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        const F2: f64 = 0.5 * (1.7320508075688772 - 1.0); // (sqrt(3)-1)/2
        const G2: f64 = (3.0 - 1.7320508075688772) / 6.0; // (3-sqrt(3))/6

        let s = (x + z) * F2;
        let i = (x + s).floor();
        let j = (z + s).floor();

        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = z - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;

        let p = &self.perm;
        let gi0 = p[ii + p[jj] as usize] as usize;
        let gi1 = p[ii + i1 + p[jj + j1] as usize] as usize;
        let gi2 = p[ii + 1 + p[jj + 1] as usize] as usize;

        let n0 = Self::corner_contribution(gi0, x0, y0);
        let n1 = Self::corner_contribution(gi1, x1, y1);
        let n2 = Self::corner_contribution(gi2, x2, y2);

        70.0 * (n0 + n1 + n2)
    }

    fn corner_contribution(gi: usize, x: f64, y: f64) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let t = t * t;
            t * t * Self::grad2d(gi, x, y)
        }
    }

    fn grad2d(hash: usize, x: f64, y: f64) -> f64 {
        const GRAD: [[f64; 2]; 8] = [
            [1.0, 1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [-1.0, -1.0],
            [1.0, 0.0],
            [-1.0, 0.0],
            [0.0, 1.0],
            [0.0, -1.0],
        ];
        let g = &GRAD[hash % GRAD.len()];
        g[0] * x + g[1] * y
    }

    fn build_permutation(seed: u64) -> [u8; 512] {
        let mut p: [u8; 256] = [0; 256];
        for (i, val) in p.iter_mut().enumerate() {
            *val = i as u8;
        }

        // Fisher-Yates shuffle driven by an LCG.
        let mut rng = seed;
        for i in (1..256).rev() {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let j = (rng >> 33) as usize % (i + 1);
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, val) in perm.iter_mut().enumerate() {
            *val = p[i & 255];
        }
        perm
    }
}
