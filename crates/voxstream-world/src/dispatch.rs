use std::collections::HashSet;
use std::sync::Arc;

use voxstream_core::math::world_to_chunk_xz;
use voxstream_core::ChunkKey;

use crate::mesher::Mesher;
use crate::presentation::Presentation;
use crate::terrain::Generator;
use crate::VoxelWorld;

impl<G, M, P> VoxelWorld<G, M, P>
where
    G: Generator + 'static,
    M: Mesher + 'static,
    P: Presentation,
{
    /// One streaming pass: evict what is no longer desired, then dispatch
    /// builds for missing chunks nearest first, within the concurrency
    /// budget. Skipped when no viewpoint has a position.
    pub fn update_streaming(&mut self) {
        let Some(position) = self.tracked_position() else {
            log::debug!("Streaming pass skipped: no viewpoint position");
            return;
        };
        let center = world_to_chunk_xz(position, self.config.block_size);
        let ordered = self.policy.desired_ordered(center);
        let desired: HashSet<ChunkKey> = ordered.iter().copied().collect();

        self.evict_undesired(&desired);
        self.dispatch_missing(&ordered);
    }

    fn evict_undesired(&mut self, desired: &HashSet<ChunkKey>) {
        let doomed: Vec<ChunkKey> = self.cache.keys().filter(|k| !desired.contains(k)).collect();
        for key in doomed {
            self.evict(key);
        }

        // Jobs for chunks that left the set complete as stale.
        let forgotten = self.pipeline.retain_pending(|k| desired.contains(k));
        if forgotten > 0 {
            log::debug!("Forgot {forgotten} pending builds outside the desired set");
        }
    }

    /// Unload one chunk: release its presentation object, persist its
    /// edits, drop the record and any pending build.
    pub fn evict(&mut self, key: ChunkKey) -> bool {
        let Some(record) = self.cache.remove(&key) else {
            return false;
        };
        if let Some(handle) = record.handle {
            self.presentation.destroy(handle);
        }
        if self.persist(key, &record.data) {
            log::debug!(
                "Evicted chunk {key} with {} modified cells",
                record.data.modified_count()
            );
        }
        self.pipeline.forget(key);
        self.stats.evicted += 1;
        true
    }

    fn dispatch_missing(&mut self, ordered: &[ChunkKey]) {
        // Orphaned jobs still hold their slot until their result is drained.
        let mut slots = self
            .config
            .max_concurrent_background_tasks
            .saturating_sub(self.pipeline.in_flight_count());

        for &key in ordered {
            if slots == 0 {
                break;
            }
            if self.has_live_handle(key) || self.pipeline.is_pending(key) {
                continue;
            }
            if self.dispatch_build(key) {
                slots -= 1;
            }
        }
    }

    pub(crate) fn has_live_handle(&self, key: ChunkKey) -> bool {
        self.cache
            .get(&key)
            .and_then(|r| r.handle)
            .is_some_and(|h| self.presentation.is_live(h))
    }

    /// Schedule a build for `key`, snapshotting loaded data if there is any.
    /// Taking the snapshot clears the dirty flag. No-op while a build for
    /// `key` is pending.
    pub(crate) fn dispatch_build(&mut self, key: ChunkKey) -> bool {
        if self.pipeline.is_pending(key) {
            return false;
        }
        let snapshot = self.cache.get_mut(&key).map(|record| {
            record.dirty = false;
            Arc::new(record.data.clone())
        });
        let reused = snapshot.is_some();

        match self.pipeline.dispatch(key, snapshot) {
            Some(ticket) => {
                self.stats.dispatched += 1;
                log::debug!("Dispatched build {ticket} for chunk {key} (reuse: {reused})");
                true
            }
            None => false,
        }
    }
}
