//! End-to-end scenarios driving a world through the real worker pool.

use std::path::Path;
use std::time::{Duration, Instant};

use glam::{IVec3, Vec3};
use tempfile::TempDir;
use voxstream_core::math::{chunk_origin, world_to_chunk_xz};
use voxstream_core::{BlockId, ChunkData, ChunkKey, WorldConfig};
use voxstream_persist::DeltaStore;

use crate::presentation::HeadlessPresentation;
use crate::viewpoint::FnViewpoint;
use crate::{EditError, Generator, MeshBuffers, Mesher, VoxelWorld, WorldError};

const BS: f32 = 100.0;
const SEED: i32 = 4242;
const WAIT: Duration = Duration::from_secs(10);

/// Stone floor four cells deep.
struct FlatGenerator;

impl Generator for FlatGenerator {
    fn generate(&self, _seed: i32, _key: ChunkKey, chunk: &mut ChunkData) {
        for y in 0..4 {
            for z in 0..16 {
                for x in 0..16 {
                    chunk.set_baseline(IVec3::new(x, y, z), BlockId::Stone);
                }
            }
        }
    }
}

/// One vertex per modified cell, so the presented geometry shows which
/// edits a build saw.
struct CountingMesher;

impl Mesher for CountingMesher {
    fn build_mesh(&self, chunk: &ChunkData, _block_size: f32) -> MeshBuffers {
        MeshBuffers {
            vertices: vec![Vec3::ZERO; chunk.modified_count()],
            ..MeshBuffers::default()
        }
    }
}

type TestWorld = VoxelWorld<FlatGenerator, CountingMesher, HeadlessPresentation>;

fn test_config(root: &Path) -> WorldConfig {
    WorldConfig {
        render_radius_chunks: 1,
        world_seed: SEED,
        worker_threads: 2,
        max_drain_per_tick: 64,
        save_root: root.to_path_buf(),
        ..WorldConfig::default()
    }
}

fn test_world(root: &Path) -> TestWorld {
    VoxelWorld::new(
        test_config(root),
        FlatGenerator,
        CountingMesher,
        HeadlessPresentation::new(),
    )
    .expect("world")
}

fn center_of(key: ChunkKey) -> Vec3 {
    chunk_origin(key, BS) + Vec3::new(800.0, 800.0, 0.0)
}

/// Track `pos` and run streaming passes until every desired chunk is
/// presented.
fn stream_to(world: &mut TestWorld, pos: Vec3) {
    world.set_tracked(pos);
    let desired = world.policy().desired_ordered(world_to_chunk_xz(pos, BS));
    for _ in 0..10 {
        world.update_streaming();
        assert!(world.settle(WAIT), "pipeline did not settle");
        if desired.iter().all(|k| world.handle_of(*k).is_some()) {
            return;
        }
    }
    panic!("streaming did not converge around {pos}");
}

/// Keep draining until `done` holds or the wait expires.
fn drain_until(world: &mut TestWorld, done: impl Fn(&TestWorld) -> bool) {
    let deadline = Instant::now() + WAIT;
    while !done(world) {
        assert!(Instant::now() < deadline, "condition not reached in time");
        if world.drain_completed() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

#[test]
fn test_streams_desired_square() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));

    assert_eq!(world.loaded_count(), 9);
    assert_eq!(world.pending_count(), 0);
    assert_eq!(world.presentation().live_count(), 9);
    for x in -1..=1 {
        for z in -1..=1 {
            let key = ChunkKey::new(x, z);
            let handle = world.handle_of(key).expect("presented");
            let object = world.presentation().object(handle).expect("live");
            assert_eq!(object.origin, chunk_origin(key, BS));
            assert_eq!(object.block_size, BS);
            // Fresh terrain has no edits, so the counting mesh is empty.
            assert_eq!(object.vertex_count, 0);
        }
    }

    let stats = world.stats();
    assert_eq!(stats.dispatched, 9);
    assert_eq!(stats.completed, 9);
    assert_eq!(stats.discarded, 0);
}

#[test]
fn test_concurrency_budget_limits_first_pass() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    world.set_tracked(center_of(ChunkKey::ZERO));
    world.start();
    assert_eq!(world.pending_count(), 8);
    // The one chunk left out is a corner, the farthest by Manhattan distance.
    let corners = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
    let skipped: Vec<_> = corners
        .iter()
        .map(|&(x, z)| ChunkKey::new(x, z))
        .filter(|k| !world.is_pending(*k))
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(world.is_pending(ChunkKey::ZERO));

    // A second pass with no free slots dispatches nothing.
    world.update_streaming();
    assert_eq!(world.stats().dispatched, 8);
}

#[test]
fn test_edit_during_build_resubmits_once() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));
    let key = ChunkKey::ZERO;
    let before = world.stats();

    world
        .place_block(key, IVec3::new(1, 5, 1), BlockId::Sand)
        .expect("first edit");
    assert!(world.is_pending(key));
    assert!(!world.is_dirty(key), "dispatch snapshots and clears dirty");

    world
        .place_block(key, IVec3::new(2, 5, 2), BlockId::Grass)
        .expect("second edit");
    assert!(world.is_dirty(key));
    assert_eq!(world.pending_count(), 1, "no second concurrent job");

    assert!(world.settle(WAIT));

    let stats = world.stats();
    assert_eq!(stats.resubmitted - before.resubmitted, 1);
    assert_eq!(stats.dispatched - before.dispatched, 2);
    assert!(!world.is_dirty(key));

    let handle = world.handle_of(key).expect("presented");
    let object = world.presentation().object(handle).expect("live");
    assert_eq!(object.vertex_count, 2, "final build saw both edits");
    assert_eq!(object.geometry_updates, 3);

    assert_eq!(world.block_at(key, IVec3::new(1, 5, 1)), Some(BlockId::Sand));
    assert_eq!(world.block_at(key, IVec3::new(2, 5, 2)), Some(BlockId::Grass));
}

#[test]
fn test_edit_rejected_for_unloaded_chunk() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));

    let far = ChunkKey::new(9, 9);
    let err = world
        .place_block(far, IVec3::ZERO, BlockId::Stone)
        .expect_err("unloaded");
    assert_eq!(err, EditError::ChunkNotLoaded(far));
    assert_eq!(err.to_string(), "chunk (9, 9) is not loaded");
    assert!(!world.is_loaded(far));

    let err = world
        .remove_block(ChunkKey::ZERO, IVec3::new(0, 64, 0))
        .expect_err("out of bounds");
    assert!(matches!(err, EditError::OutOfBounds { .. }));
    assert!(!world.is_dirty(ChunkKey::ZERO));
    assert_eq!(world.pending_count(), 0);
    assert_eq!(world.stats().rejected_edits, 2);
}

#[test]
fn test_eviction_persists_modified_chunk() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));

    let edited = ChunkKey::new(1, 0);
    world
        .remove_block(edited, IVec3::new(3, 3, 3))
        .expect("edit");
    assert!(world.settle(WAIT));

    // Move far enough that the whole square is evicted.
    world.set_tracked(center_of(ChunkKey::new(5, 0)));
    world.update_streaming();
    assert!(!world.is_loaded(edited));
    assert!(!world.is_loaded(ChunkKey::ZERO));

    let store = DeltaStore::new(dir.path());
    assert!(store.has_delta(SEED, edited));
    assert!(!store.has_delta(SEED, ChunkKey::ZERO), "unmodified chunk wrote a file");

    let mut reloaded = ChunkData::new(edited);
    assert!(store.load_into(SEED, &mut reloaded));
    assert_eq!(reloaded.get(IVec3::new(3, 3, 3)), Some(BlockId::Air));
    assert_eq!(reloaded.modified_count(), 1);

    let stats = world.stats();
    assert_eq!(stats.evicted, 9);
    assert_eq!(stats.persisted, 1);
    assert_eq!(world.presentation().destroyed_count(), 9);

    // Coming back regenerates the chunk with the edit overlaid.
    assert!(world.settle(WAIT));
    stream_to(&mut world, center_of(ChunkKey::ZERO));
    assert_eq!(world.block_at(edited, IVec3::new(3, 3, 3)), Some(BlockId::Air));
    assert_eq!(world.block_at(edited, IVec3::new(3, 2, 3)), Some(BlockId::Stone));
    assert_eq!(world.modified_chunk_count(), 1);
}

#[test]
fn test_shutdown_flushes_edits() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));

    world
        .place_block(ChunkKey::new(-1, -1), IVec3::new(0, 4, 0), BlockId::Dirt)
        .expect("edit");
    world
        .place_block(ChunkKey::new(0, 1), IVec3::new(15, 4, 15), BlockId::Water)
        .expect("edit");

    // Both edits are still mid-build; shutdown persists the live data.
    let persisted = world.shutdown();
    assert_eq!(persisted, 2);
    assert_eq!(world.loaded_count(), 0);
    assert_eq!(world.pending_count(), 0);
    assert_eq!(world.presentation().live_count(), 0);

    let store = DeltaStore::new(dir.path());
    assert!(store.has_delta(SEED, ChunkKey::new(-1, -1)));
    assert!(store.has_delta(SEED, ChunkKey::new(0, 1)));

    // Nothing loaded, nothing more to write.
    assert_eq!(world.shutdown(), 0);
}

#[test]
fn test_persisted_edits_survive_restart() {
    let dir = TempDir::new().expect("tempdir");
    let key = ChunkKey::new(0, -1);
    {
        let mut world = test_world(dir.path());
        stream_to(&mut world, center_of(ChunkKey::ZERO));
        world
            .place_block(key, IVec3::new(7, 8, 9), BlockId::Grass)
            .expect("edit");
        assert_eq!(world.shutdown(), 1);
    }

    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));
    assert_eq!(world.block_at(key, IVec3::new(7, 8, 9)), Some(BlockId::Grass));
    let handle = world.handle_of(key).expect("presented");
    assert_eq!(
        world.presentation().object(handle).expect("live").vertex_count,
        1
    );
}

#[test]
fn test_stale_result_discarded() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    world.set_tracked(center_of(ChunkKey::ZERO));
    world.start();
    assert_eq!(world.pending_count(), 8);

    // Leave before any result is drained. The abandoned jobs still occupy
    // the whole budget, so nothing new is dispatched yet.
    let far = ChunkKey::new(10, 10);
    world.set_tracked(center_of(far));
    world.update_streaming();
    assert_eq!(world.pending_count(), 0);
    assert_eq!(world.in_flight_count(), 8);
    assert!(!world.is_pending(far));
    assert_eq!(world.stats().dispatched, 8);

    drain_until(&mut world, |w| w.in_flight_count() == 0);
    assert_eq!(world.stats().discarded, 8);
    assert_eq!(world.stats().completed, 0);
    assert_eq!(world.loaded_count(), 0);

    stream_to(&mut world, center_of(far));
    assert!(!world.is_loaded(ChunkKey::ZERO));
    assert!(world
        .loaded_keys()
        .iter()
        .all(|k| k.chebyshev_distance(far) <= 1));
}

/// Meshes nothing, slowly, so jobs are still running when the viewpoint
/// moves on.
struct SlowMesher;

impl Mesher for SlowMesher {
    fn build_mesh(&self, _chunk: &ChunkData, _block_size: f32) -> MeshBuffers {
        std::thread::sleep(Duration::from_millis(30));
        MeshBuffers::default()
    }
}

#[test]
fn test_moving_viewpoint_respects_concurrency_budget() {
    let dir = TempDir::new().expect("tempdir");
    let config = WorldConfig {
        worker_threads: 1,
        ..test_config(dir.path())
    };
    let budget = config.max_concurrent_background_tasks;
    let mut world = VoxelWorld::new(
        config,
        FlatGenerator,
        SlowMesher,
        HeadlessPresentation::new(),
    )
    .expect("world");

    world.set_tracked(center_of(ChunkKey::ZERO));
    world.start();
    for x in [4, 8, 12, 16] {
        world.set_tracked(center_of(ChunkKey::new(x, 0)));
        world.update_streaming();
        assert!(
            world.in_flight_count() <= budget,
            "{} jobs in flight after moving to x = {x}",
            world.in_flight_count()
        );
        // Nothing has been drained, so every dispatch is still outstanding.
        assert!(world.stats().dispatched <= budget as u64);
    }

    assert!(world.settle(WAIT));
    assert_eq!(world.in_flight_count(), 0);
    assert_eq!(world.stats().discarded, world.stats().dispatched);

    // With the slots released, the square at the world edge streams in.
    world.update_streaming();
    assert_eq!(world.pending_count(), 6);
    assert!(world.settle(WAIT));
    assert_eq!(world.loaded_count(), 6);
}

#[test]
fn test_world_limit_never_loaded() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    let edge = ChunkKey::new(16, 0);
    stream_to(&mut world, center_of(edge));

    assert_eq!(world.loaded_count(), 6);
    assert!(world.loaded_keys().iter().all(|k| k.x <= 16));
    assert!(!world.is_loaded(ChunkKey::new(17, 0)));
}

#[test]
fn test_presentation_failure_then_recovery() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    world.presentation_mut().set_fail_create(true);
    world.set_tracked(center_of(ChunkKey::ZERO));
    world.start();
    assert!(world.settle(WAIT));

    assert_eq!(world.stats().presentation_failures, 8);
    assert_eq!(world.loaded_count(), 8);
    assert!(world.handle_of(ChunkKey::ZERO).is_none());

    // Edits still land on the loaded data.
    world
        .place_block(ChunkKey::ZERO, IVec3::new(0, 10, 0), BlockId::Sand)
        .expect("edit");
    assert!(world.settle(WAIT));

    world.presentation_mut().set_fail_create(false);
    stream_to(&mut world, center_of(ChunkKey::ZERO));
    let handle = world.handle_of(ChunkKey::ZERO).expect("presented");
    assert_eq!(
        world.presentation().object(handle).expect("live").vertex_count,
        1
    );
}

#[test]
fn test_tick_streams_on_interval() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    world.set_tracked(center_of(ChunkKey::ZERO));

    world.tick(0.1);
    assert_eq!(world.stats().dispatched, 0);

    world.tick(0.1);
    assert_eq!(world.stats().dispatched, 8);

    // Drain-only ticks eventually present everything that was dispatched.
    drain_until(&mut world, |w| w.pending_count() == 0);
    assert_eq!(world.stats().completed, 8);
}

#[test]
fn test_viewpoint_fallback() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());

    world.start();
    assert_eq!(world.pending_count(), 0, "no viewpoint, no streaming");

    world.set_primary(center_of(ChunkKey::new(2, 2)));
    world.set_tracked(FnViewpoint(|| -> Option<Vec3> { None }));
    assert_eq!(world.tracked_position(), Some(center_of(ChunkKey::new(2, 2))));
    world.update_streaming();
    assert!(world.is_pending(ChunkKey::new(2, 2)));

    world.set_tracked(center_of(ChunkKey::new(-3, 0)));
    assert_eq!(world.tracked_position(), Some(center_of(ChunkKey::new(-3, 0))));
    world.clear_tracked();
    assert_eq!(world.tracked_position(), Some(center_of(ChunkKey::new(2, 2))));
}

#[test]
fn test_hit_point_edits() {
    let dir = TempDir::new().expect("tempdir");
    let mut world = test_world(dir.path());
    stream_to(&mut world, center_of(ChunkKey::ZERO));

    // Top face of floor cell (2, 3, 2), looking straight down.
    let hit = Vec3::new(200.0, 200.0, 350.0);
    let down = Vec3::new(0.0, 0.0, -1.0);

    let placed = world
        .place_at_hit(hit, down, BlockId::Grass)
        .expect("place");
    assert_eq!(placed.key, ChunkKey::ZERO);
    assert_eq!(placed.local, IVec3::new(2, 4, 2));
    assert_eq!(world.block_at(ChunkKey::ZERO, IVec3::new(2, 4, 2)), Some(BlockId::Grass));

    let removed = world.remove_at_hit(hit, down).expect("remove");
    assert_eq!(removed.local, IVec3::new(2, 3, 2));
    assert_eq!(world.block_at(ChunkKey::ZERO, IVec3::new(2, 3, 2)), Some(BlockId::Air));

    // A side hit across a chunk border lands in the neighbor.
    let side = world
        .remove_at_hit(Vec3::new(-50.0, 300.0, 100.0), Vec3::new(-1.0, 0.0, 0.0))
        .expect("remove");
    assert_eq!(side.key, ChunkKey::new(-1, 0));
    assert_eq!(side.local, IVec3::new(15, 1, 3));
    assert!(world.settle(WAIT));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let config = WorldConfig {
        render_radius_chunks: 0,
        ..test_config(dir.path())
    };
    let result = VoxelWorld::new(
        config,
        FlatGenerator,
        CountingMesher,
        HeadlessPresentation::new(),
    );
    assert!(matches!(result, Err(WorldError::Config(_))));
}
