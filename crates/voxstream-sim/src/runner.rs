use std::time::{Duration, Instant};

use glam::{IVec3, Vec3};
use voxstream_core::constants::CHUNK_SIZE_Y;
use voxstream_core::math::world_to_voxel;
use voxstream_core::{BlockId, WorldConfig};
use voxstream_world::{
    HeadlessPresentation, NaiveMesher, TerrainGenerator, VoxelWorld, WorldError, WorldStats,
};

/// Simulated frame length (60 Hz).
pub const TICK_SECS: f32 = 1.0 / 60.0;

/// How long the final settle may wait for in-flight builds.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters of one soak run.
#[derive(Debug, Clone)]
pub struct SoakOptions {
    pub ticks: u32,
    /// Viewpoint speed along +X, in world units per second.
    pub speed: f32,
    /// Place a block under the viewpoint every n ticks; 0 disables edits.
    pub edit_every: u32,
}

impl Default for SoakOptions {
    fn default() -> Self {
        Self {
            ticks: 600,
            speed: 800.0,
            edit_every: 30,
        }
    }
}

/// Cost of the main-loop tick (streaming pass, drain and edit) over a run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TickProfile {
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
    /// Ticks that took longer than the simulated frame.
    pub over_frame: usize,
}

impl TickProfile {
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let frame = Duration::from_secs_f32(TICK_SECS);
        let total: Duration = sorted.iter().sum();
        Self {
            mean_ms: ms(total) / sorted.len() as f64,
            p50_ms: ms(nearest_rank(&sorted, 50)),
            p99_ms: ms(nearest_rank(&sorted, 99)),
            max_ms: ms(sorted[sorted.len() - 1]),
            over_frame: sorted.iter().filter(|&&d| d > frame).count(),
        }
    }
}

/// Nearest-rank percentile of a non-empty ascending slice.
fn nearest_rank(sorted: &[Duration], pct: usize) -> Duration {
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank.min(sorted.len()) - 1]
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Outcome of a soak run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SoakResult {
    pub ticks: u32,
    pub final_position: [f32; 3],
    pub loaded_chunks: usize,
    pub modified_chunks: usize,
    pub edits_accepted: u32,
    pub edits_rejected: u32,
    pub settled: bool,
    pub persisted_on_shutdown: usize,
    /// Most jobs outstanding after any tick; bounded by the config.
    pub peak_in_flight: usize,
    pub stats: WorldStats,
    pub ticks_profile: TickProfile,
}

type SoakWorld = VoxelWorld<TerrainGenerator, NaiveMesher, HeadlessPresentation>;

/// Drive a headless world along +X, editing as it goes, then shut it down.
pub fn run_soak(config: WorldConfig, options: &SoakOptions) -> Result<SoakResult, WorldError> {
    let mut world: SoakWorld = VoxelWorld::new(
        config,
        TerrainGenerator::new(),
        NaiveMesher,
        HeadlessPresentation::new(),
    )?;

    let mut position = Vec3::new(0.0, 0.0, 0.0);
    world.set_tracked(position);
    world.start();

    let mut samples = Vec::with_capacity(options.ticks as usize);
    let mut peak_in_flight = 0;
    let mut edits_accepted = 0u32;
    let mut edits_rejected = 0u32;

    for tick in 1..=options.ticks {
        position.x += options.speed * TICK_SECS;
        world.set_tracked(position);

        let start = Instant::now();
        world.tick(TICK_SECS);
        if options.edit_every > 0 && tick % options.edit_every == 0 {
            match place_under(&mut world, position) {
                Ok(()) => edits_accepted += 1,
                Err(e) => {
                    edits_rejected += 1;
                    log::debug!("Tick {tick}: edit skipped: {e}");
                }
            }
        }
        samples.push(start.elapsed());
        peak_in_flight = peak_in_flight.max(world.in_flight_count());

        if tick % 60 == 0 {
            log::info!(
                "Tick {tick}: {} loaded, {} in flight, x = {:.0}",
                world.loaded_count(),
                world.in_flight_count(),
                position.x
            );
        }
    }

    let settled = world.settle(SETTLE_TIMEOUT);
    if !settled {
        log::warn!("Builds still pending after {SETTLE_TIMEOUT:?}");
    }
    let loaded_chunks = world.loaded_count();
    let modified_chunks = world.modified_chunk_count();
    let persisted_on_shutdown = world.shutdown();

    Ok(SoakResult {
        ticks: options.ticks,
        final_position: position.to_array(),
        loaded_chunks,
        modified_chunks,
        edits_accepted,
        edits_rejected,
        settled,
        persisted_on_shutdown,
        peak_in_flight,
        stats: world.stats(),
        ticks_profile: TickProfile::from_samples(&samples),
    })
}

/// Stack a stone block on the topmost non-air cell of the column under
/// `position`.
fn place_under(world: &mut SoakWorld, position: Vec3) -> Result<(), String> {
    let address = world_to_voxel(position, world.config().block_size);
    if !world.is_loaded(address.key) {
        return Err(format!("chunk {} not loaded yet", address.key));
    }

    let top = (0..CHUNK_SIZE_Y as i32)
        .rev()
        .find(|&y| {
            let cell = IVec3::new(address.local.x, y, address.local.z);
            world
                .block_at(address.key, cell)
                .is_some_and(|b| b != BlockId::Air)
        })
        .unwrap_or(-1);
    let target = IVec3::new(address.local.x, top + 1, address.local.z);

    world
        .place_block(address.key, target, BlockId::Stone)
        .map_err(|e| e.to_string())
}
