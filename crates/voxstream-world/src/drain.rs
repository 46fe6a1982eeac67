use std::sync::Arc;

use voxstream_core::math::chunk_origin;

use crate::mesher::Mesher;
use crate::pipeline::ChunkMeshResult;
use crate::presentation::Presentation;
use crate::terrain::Generator;
use crate::VoxelWorld;

impl<G, M, P> VoxelWorld<G, M, P>
where
    G: Generator + 'static,
    M: Mesher + 'static,
    P: Presentation,
{
    /// Consume at most `max_drain_per_tick` completed builds. Returns how
    /// many results were taken off the queue (accepted or not).
    pub fn drain_completed(&mut self) -> usize {
        let mut drained = 0;
        while drained < self.config.max_drain_per_tick {
            let Some(result) = self.pipeline.try_recv() else {
                break;
            };
            drained += 1;
            self.accept(result);
        }
        drained
    }

    fn accept(&mut self, result: ChunkMeshResult) {
        let ChunkMeshResult {
            key,
            ticket,
            block_size,
            data,
            mesh,
        } = result;

        if !self.pipeline.complete(key, ticket) {
            self.stats.discarded += 1;
            log::debug!("Discarded stale build {ticket} for chunk {key}");
            return;
        }
        if !self.policy.in_world_limit(key) {
            self.stats.discarded += 1;
            log::debug!("Discarded build for chunk {key} outside the world limit");
            return;
        }
        self.stats.completed += 1;

        // A loaded record keeps its own data: it already holds every edit
        // the snapshot had, plus any made since.
        let record = self
            .cache
            .get_or_insert_with(key, || Arc::unwrap_or_clone(data));

        let handle = match record.handle.filter(|h| self.presentation.is_live(*h)) {
            Some(handle) => handle,
            None => match self.presentation.create(chunk_origin(key, block_size), block_size) {
                Some(handle) => {
                    record.handle = Some(handle);
                    handle
                }
                None => {
                    record.handle = None;
                    self.stats.presentation_failures += 1;
                    log::warn!("Presentation unavailable for chunk {key}; dropping build");
                    return;
                }
            },
        };
        self.presentation.set_geometry(handle, &mesh);

        if record.dirty && self.dispatch_build(key) {
            self.stats.resubmitted += 1;
            log::debug!("Resubmitted chunk {key}: edited during build");
        }
    }
}
