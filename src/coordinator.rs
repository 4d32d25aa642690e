//! Batched write coordination.
//!
//! A [`WriteCoordinator`] accumulates pending writes keyed by id and drains
//! them on a fixed timer as one bulk call, fanning the per-id outcomes back
//! out to the callers blocked in [`submit`](WriteCoordinator::submit). Ids
//! present in the pending set at the instant a cycle snapshots it are all
//! part of that cycle's bulk call and result set; ids inserted after the
//! snapshot wait for the next cycle.
//!
//! Failed bulk calls are not retried. A transport-level failure is terminal
//! for every id drained in that cycle; their waiters surface
//! [`MejiroError::MissingResult`], and the coordinator keeps running for
//! subsequent cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ahash::AHashMap;
use log::{debug, error};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;

use crate::client::{StoreClient, WriteOutcome};
use crate::error::{MejiroError, Result};

/// Default interval between flush cycles.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for a write coordinator.
#[derive(Debug, Clone)]
pub struct WriteCoordinatorConfig {
    /// Index every flushed batch is written to.
    pub index: String,
    /// Interval between flush cycles.
    pub flush_interval: Duration,
}

impl Default for WriteCoordinatorConfig {
    fn default() -> Self {
        WriteCoordinatorConfig {
            index: "entities".to_string(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Shared mutable state between submitters and the flush task.
///
/// Cycles are numbered by two counters: `drained_cycles` advances when a
/// flush snapshots the pending set, `completed_cycles` when that flush's
/// outcome is published. A submitter inserted while `drained_cycles == n`
/// is drained by cycle `n + 1`, so it waits until `completed_cycles`
/// reaches `n + 1`. Capturing the target under the same lock as the insert
/// is what makes the wait race-free against an in-flight flush.
struct CoordinatorState {
    pending: AHashMap<String, Value>,
    last_result: AHashMap<String, WriteOutcome>,
    drained_cycles: u64,
    completed_cycles: u64,
}

/// Accumulates writes and flushes them to the store on a fixed timer.
///
/// One background task per coordinator runs until [`shutdown`] is called;
/// any number of callers may [`submit`] concurrently. The shutdown flag is
/// observed once per tick, so writes submitted after the last observed tick
/// are never flushed and their callers stay parked until the coordinator is
/// dropped.
///
/// [`submit`]: WriteCoordinator::submit
/// [`shutdown`]: WriteCoordinator::shutdown
pub struct WriteCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    // Held here as well as by the flush task, so waiters stay parked rather
    // than erroring when the task exits before them.
    _cycle_tx: Arc<watch::Sender<u64>>,
    cycle_rx: watch::Receiver<u64>,
    stop: Arc<AtomicBool>,
}

impl WriteCoordinator {
    /// Start a coordinator and its background flush task.
    pub fn start(client: Arc<dyn StoreClient>, config: WriteCoordinatorConfig) -> Self {
        let state = Arc::new(Mutex::new(CoordinatorState {
            pending: AHashMap::new(),
            last_result: AHashMap::new(),
            drained_cycles: 0,
            completed_cycles: 0,
        }));
        let (cycle_tx, cycle_rx) = watch::channel(0u64);
        let cycle_tx = Arc::new(cycle_tx);
        let stop = Arc::new(AtomicBool::new(false));

        tokio::spawn(flush_loop(
            client,
            config,
            Arc::clone(&state),
            Arc::clone(&cycle_tx),
            Arc::clone(&stop),
        ));

        WriteCoordinator {
            state,
            _cycle_tx: cycle_tx,
            cycle_rx,
            stop,
        }
    }

    /// Submit a write and block until its flush cycle resolves.
    ///
    /// Fails immediately with [`MejiroError::DuplicateKey`] when `id` is
    /// already pending; an id must not be resubmitted until its prior
    /// submission has been flushed and observed. Otherwise the call parks
    /// until the cycle that drains this id publishes its outcome:
    /// a store-reported failure surfaces as [`MejiroError::Indexing`], a
    /// cycle that produced no outcome for the id (transport failure) as
    /// [`MejiroError::MissingResult`].
    pub async fn submit(&self, id: &str, payload: Value) -> Result<()> {
        let target_cycle = {
            let mut state = self.state.lock();
            if state.pending.contains_key(id) {
                return Err(MejiroError::duplicate_key(id));
            }
            state.pending.insert(id.to_string(), payload);
            state.drained_cycles + 1
        };

        let mut cycle_rx = self.cycle_rx.clone();
        while *cycle_rx.borrow_and_update() < target_cycle {
            if cycle_rx.changed().await.is_err() {
                return Err(MejiroError::internal("write coordinator was dropped"));
            }
        }

        let state = self.state.lock();
        match state.last_result.get(id) {
            None => Err(MejiroError::missing_result(id)),
            Some(WriteOutcome::Failure(reason)) => Err(MejiroError::indexing(id, reason.clone())),
            Some(WriteOutcome::Success) => Ok(()),
        }
    }

    /// Request a cooperative stop.
    ///
    /// The flag is checked at the top of the next tick; the in-flight tick,
    /// if any, still completes. Callers already parked, or submitting after
    /// the last observed tick, are not unblocked.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Number of writes waiting for the next flush cycle.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

async fn flush_loop(
    client: Arc<dyn StoreClient>,
    config: WriteCoordinatorConfig,
    state: Arc<Mutex<CoordinatorState>>,
    cycle_tx: Arc<watch::Sender<u64>>,
    stop: Arc<AtomicBool>,
) {
    loop {
        if stop.load(Ordering::SeqCst) {
            debug!("write coordinator for index {} stopping", config.index);
            break;
        }

        tokio::time::sleep(config.flush_interval).await;

        // Snapshot-and-clear under the lock; the bulk call happens outside
        // it so submitters are never blocked on the store.
        let snapshot = {
            let mut state = state.lock();
            if state.pending.is_empty() {
                continue;
            }
            state.drained_cycles += 1;
            std::mem::take(&mut state.pending)
        };

        debug!(
            "flushing {} pending writes to index {}",
            snapshot.len(),
            config.index
        );
        let outcome = client.bulk_write(&config.index, snapshot).await;

        let completed = {
            let mut state = state.lock();
            match outcome {
                Ok(results) => state.last_result = results,
                // No per-id outcomes for this cycle; its waiters observe a
                // missing result. The previous result set is retained.
                Err(e) => error!("bulk write to index {} failed: {e}", config.index),
            }
            state.completed_cycles += 1;
            state.completed_cycles
        };

        cycle_tx.send_replace(completed);
    }
}
