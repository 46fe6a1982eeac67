use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use voxstream_core::{ChunkData, ChunkKey};
use voxstream_persist::DeltaStore;

use crate::mesher::{MeshBuffers, Mesher};
use crate::terrain::Generator;

/// Output of one build job, consumed exactly once by the main loop.
#[derive(Debug)]
pub struct ChunkMeshResult {
    pub key: ChunkKey,
    /// Ticket of the dispatch that produced this result.
    pub ticket: u64,
    pub block_size: f32,
    /// The data the mesh was built from.
    pub data: Arc<ChunkData>,
    pub mesh: MeshBuffers,
}

/// Everything a worker needs to build a chunk. Shared read-only by all jobs.
pub struct BuildContext<G, M> {
    pub generator: G,
    pub mesher: M,
    pub store: DeltaStore,
    pub seed: i32,
    pub block_size: f32,
}

/// Produce the result for one job.
///
/// Without a snapshot the chunk is generated from the seed and any
/// persisted delta is overlaid; a missing delta leaves the baseline.
pub fn build_chunk<G: Generator, M: Mesher>(
    ctx: &BuildContext<G, M>,
    key: ChunkKey,
    ticket: u64,
    snapshot: Option<Arc<ChunkData>>,
) -> ChunkMeshResult {
    let data = match snapshot {
        Some(data) => data,
        None => {
            let mut data = ChunkData::new(key);
            ctx.generator.generate(ctx.seed, key, &mut data);
            ctx.store.load_into(ctx.seed, &mut data);
            Arc::new(data)
        }
    };
    let mesh = ctx.mesher.build_mesh(&data, ctx.block_size);
    ChunkMeshResult {
        key,
        ticket,
        block_size: ctx.block_size,
        data,
        mesh,
    }
}

/// Off-thread chunk builds with a pending map and a completion queue.
///
/// Workers only build and send; the pending map is touched by the owner
/// (the main loop) alone. A forgotten job keeps occupying a worker until
/// its result is received, so its ticket moves to `orphaned` and still
/// counts as in flight.
pub struct BuildPipeline<G, M> {
    pool: rayon::ThreadPool,
    context: Arc<BuildContext<G, M>>,
    done_tx: Sender<ChunkMeshResult>,
    done_rx: Receiver<ChunkMeshResult>,
    /// Key -> ticket of the outstanding job.
    pending: HashMap<ChunkKey, u64>,
    /// Tickets of forgotten jobs whose results have not come back yet.
    orphaned: HashSet<u64>,
    next_ticket: u64,
}

impl<G, M> BuildPipeline<G, M>
where
    G: Generator + 'static,
    M: Mesher + 'static,
{
    /// `worker_threads == 0` lets rayon pick one thread per CPU.
    pub fn new(
        context: BuildContext<G, M>,
        worker_threads: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("voxstream-build-{i}"))
            .build()?;
        let (done_tx, done_rx) = unbounded();
        Ok(Self {
            pool,
            context: Arc::new(context),
            done_tx,
            done_rx,
            pending: HashMap::new(),
            orphaned: HashSet::new(),
            next_ticket: 0,
        })
    }

    pub fn context(&self) -> &BuildContext<G, M> {
        &self.context
    }

    /// Schedule a build for `key`. Returns the job ticket, or `None` when a
    /// job for `key` is already pending.
    ///
    /// The key is marked pending before the job is queued.
    pub fn dispatch(&mut self, key: ChunkKey, snapshot: Option<Arc<ChunkData>>) -> Option<u64> {
        if self.pending.contains_key(&key) {
            return None;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending.insert(key, ticket);

        let context = Arc::clone(&self.context);
        let done_tx = self.done_tx.clone();
        self.pool.spawn(move || {
            let result = build_chunk(&context, key, ticket, snapshot);
            if done_tx.send(result).is_err() {
                log::debug!("Build result for chunk {key} dropped: pipeline closed");
            }
        });
        Some(ticket)
    }

    /// Next completed result, if any. Never blocks.
    pub fn try_recv(&self) -> Option<ChunkMeshResult> {
        self.done_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completed result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ChunkMeshResult> {
        self.done_rx.recv_timeout(timeout).ok()
    }

    /// Settle the pending entry for a received result. Returns false when
    /// the result is stale: its key was forgotten or re-dispatched since.
    pub fn complete(&mut self, key: ChunkKey, ticket: u64) -> bool {
        if self.orphaned.remove(&ticket) {
            return false;
        }
        match self.pending.get(&key) {
            Some(&current) if current == ticket => {
                self.pending.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Drop the pending entry for `key`; its result will arrive stale.
    pub fn forget(&mut self, key: ChunkKey) -> bool {
        match self.pending.remove(&key) {
            Some(ticket) => {
                self.orphaned.insert(ticket);
                true
            }
            None => false,
        }
    }

    /// Forget every pending key for which `keep` is false. Returns how many
    /// were forgotten.
    pub fn retain_pending(&mut self, mut keep: impl FnMut(&ChunkKey) -> bool) -> usize {
        let orphaned = &mut self.orphaned;
        let before = self.pending.len();
        self.pending.retain(|key, ticket| {
            let kept = keep(key);
            if !kept {
                orphaned.insert(*ticket);
            }
            kept
        });
        before - self.pending.len()
    }

    pub fn is_pending(&self, key: ChunkKey) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Jobs dispatched whose results have not been received: pending plus
    /// orphaned. This is what the concurrency budget is charged against.
    pub fn in_flight_count(&self) -> usize {
        self.pending.len() + self.orphaned.len()
    }

    /// Drop all bookkeeping. Results still on the pool arrive unclaimed.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.orphaned.clear();
    }
}
