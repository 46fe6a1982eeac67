pub mod chunk;
pub mod chunk_map;
pub mod dispatch;
pub mod drain;
pub mod edit;
pub mod error;
pub mod mesher;
pub mod pipeline;
pub mod presentation;
pub mod streaming;
pub mod terrain;
pub mod viewpoint;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use glam::Vec3;
use serde::Serialize;
use voxstream_core::{BlockId, ChunkKey, LocalCoord, WorldConfig};
use voxstream_persist::DeltaStore;

use chunk_map::ChunkCache;
use pipeline::{BuildContext, BuildPipeline};
use presentation::{HandleId, Presentation};
use streaming::StreamingPolicy;
use viewpoint::Viewpoint;

pub use error::{EditError, WorldError};
pub use mesher::{MeshBuffers, Mesher, NaiveMesher};
pub use presentation::HeadlessPresentation;
pub use terrain::{Generator, TerrainGenerator};

/// Running totals for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    /// Build jobs scheduled.
    pub dispatched: u64,
    /// Results accepted by the drain.
    pub completed: u64,
    /// Results dropped as stale or outside the world.
    pub discarded: u64,
    /// Rebuilds dispatched because edits landed during a build.
    pub resubmitted: u64,
    /// Chunks whose delta was written on eviction or shutdown.
    pub persisted: u64,
    pub persist_failures: u64,
    pub evicted: u64,
    pub presentation_failures: u64,
    pub edits: u64,
    pub rejected_edits: u64,
}

/// A streamed voxel world around a tracked viewpoint.
///
/// Single-threaded owner of the chunk cache; block generation and meshing
/// run on the build pipeline's workers. Drive it with [`VoxelWorld::start`],
/// then [`VoxelWorld::tick`] every frame, and finish with
/// [`VoxelWorld::shutdown`] to persist outstanding edits.
pub struct VoxelWorld<G, M, P> {
    config: WorldConfig,
    policy: StreamingPolicy,
    cache: ChunkCache,
    pipeline: BuildPipeline<G, M>,
    presentation: P,
    store: DeltaStore,
    tracked: Option<Box<dyn Viewpoint>>,
    primary: Option<Box<dyn Viewpoint>>,
    since_update: f32,
    stats: WorldStats,
}

impl<G, M, P> VoxelWorld<G, M, P>
where
    G: Generator + 'static,
    M: Mesher + 'static,
    P: Presentation,
{
    pub fn new(
        config: WorldConfig,
        generator: G,
        mesher: M,
        presentation: P,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let store = DeltaStore::new(config.save_root.clone());
        let context = BuildContext {
            generator,
            mesher,
            store: store.clone(),
            seed: config.world_seed,
            block_size: config.block_size,
        };
        let pipeline = BuildPipeline::new(context, config.worker_threads)?;

        Ok(Self {
            policy: StreamingPolicy::from_config(&config),
            config,
            cache: ChunkCache::new(),
            pipeline,
            presentation,
            store,
            tracked: None,
            primary: None,
            since_update: 0.0,
            stats: WorldStats::default(),
        })
    }

    /// Follow `viewpoint` for streaming.
    pub fn set_tracked(&mut self, viewpoint: impl Viewpoint + 'static) {
        self.tracked = Some(Box::new(viewpoint));
    }

    pub fn clear_tracked(&mut self) {
        self.tracked = None;
    }

    /// Fallback used when no tracked viewpoint has a position.
    pub fn set_primary(&mut self, viewpoint: impl Viewpoint + 'static) {
        self.primary = Some(Box::new(viewpoint));
    }

    pub fn tracked_position(&self) -> Option<Vec3> {
        viewpoint::resolve(self.tracked.as_deref(), self.primary.as_deref())
    }

    /// Run one streaming pass right away.
    pub fn start(&mut self) {
        log::info!(
            "Voxel world starting: seed {}, radius {}, world limit {}, {} concurrent builds",
            self.config.world_seed,
            self.policy.render_radius,
            self.policy.radius_limit,
            self.config.max_concurrent_background_tasks
        );
        self.since_update = 0.0;
        self.update_streaming();
    }

    /// Advance by `delta_secs`: a streaming pass once the update interval
    /// has elapsed, then a bounded drain of completed builds.
    pub fn tick(&mut self, delta_secs: f32) {
        self.since_update += delta_secs.max(0.0);
        if self.since_update >= self.config.update_interval_secs {
            self.since_update = 0.0;
            self.update_streaming();
        }
        self.drain_completed();
    }

    /// Drain until no job is in flight or `timeout` elapses. Returns true
    /// when the pipeline went idle. Runs no streaming passes.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pipeline.in_flight_count() > 0 {
            if self.drain_completed() == 0 {
                if Instant::now() >= deadline {
                    return false;
                }
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        true
    }

    /// Persist every loaded chunk with edits, release all presentation
    /// objects and empty the cache. Returns the number of chunks persisted.
    pub fn shutdown(&mut self) -> usize {
        let mut persisted = 0;
        let records: Vec<_> = self.cache.drain().collect();
        for (key, record) in records {
            if let Some(handle) = record.handle {
                self.presentation.destroy(handle);
            }
            if self.persist(key, &record.data) {
                persisted += 1;
            }
        }
        self.pipeline.clear();
        log::info!(
            "Voxel world shut down: {persisted} chunks persisted, {} builds dispatched, {} discarded",
            self.stats.dispatched,
            self.stats.discarded
        );
        persisted
    }

    /// Write `data`'s delta if it has edits. Logs and counts failures.
    pub(crate) fn persist(&mut self, key: ChunkKey, data: &voxstream_core::ChunkData) -> bool {
        match self.store.save(self.config.world_seed, data) {
            Ok(true) => {
                self.stats.persisted += 1;
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.stats.persist_failures += 1;
                log::error!("Failed to persist chunk {key}: {e}");
                false
            }
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn policy(&self) -> &StreamingPolicy {
        &self.policy
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pipeline.pending_count()
    }

    pub fn is_loaded(&self, key: ChunkKey) -> bool {
        self.cache.contains(&key)
    }

    /// Dispatched jobs whose results have not been drained, including
    /// jobs for chunks no longer wanted.
    pub fn in_flight_count(&self) -> usize {
        self.pipeline.in_flight_count()
    }

    pub fn is_pending(&self, key: ChunkKey) -> bool {
        self.pipeline.is_pending(key)
    }

    pub fn is_dirty(&self, key: ChunkKey) -> bool {
        self.cache.get(&key).is_some_and(|r| r.dirty)
    }

    pub fn block_at(&self, key: ChunkKey, local: LocalCoord) -> Option<BlockId> {
        self.cache.get(&key).and_then(|r| r.data.get(local))
    }

    pub fn handle_of(&self, key: ChunkKey) -> Option<HandleId> {
        self.cache.get(&key).and_then(|r| r.handle)
    }

    pub fn loaded_keys(&self) -> Vec<ChunkKey> {
        self.cache.keys().collect()
    }

    pub fn modified_chunk_count(&self) -> usize {
        self.cache.modified_count()
    }

    pub fn store(&self) -> &DeltaStore {
        &self.store
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }
}
