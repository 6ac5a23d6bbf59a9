//! Memory introspection and held allocations

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use rand::RngCore;
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, warn};

use super::types::{MemoryReport, ServerError};

pub const MIB: u64 = 1024 * 1024;

/// Convert bytes to MiB, rounded to two decimals
pub fn to_mib(bytes: u64) -> f64 {
    (bytes as f64 / MIB as f64 * 100.0).round() / 100.0
}

/// Take a memory snapshot of this process and the host
pub fn memory_report() -> Result<MemoryReport, ServerError> {
    let pid = sysinfo::get_current_pid().map_err(|e| ServerError::Memory(e.to_string()))?;

    let mut system = System::new();
    system.refresh_memory();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    let process = system
        .process(pid)
        .ok_or_else(|| ServerError::Memory(format!("process {} not found", pid)))?;

    Ok(MemoryReport {
        rss: to_mib(process.memory()),
        virtual_memory: to_mib(process.virtual_memory()),
        system_total: to_mib(system.total_memory()),
        system_used: to_mib(system.used_memory()),
    })
}

/// Counts memory currently held by `/allocate`
#[derive(Debug, Default)]
pub struct AllocationTracker {
    live: AtomicU64,
    live_bytes: AtomicU64,
    total_bytes: AtomicU64,
}

impl AllocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocations currently held
    pub fn live(&self) -> u64 {
        self.live.load(Ordering::Relaxed)
    }

    /// Bytes currently held
    pub fn live_bytes(&self) -> u64 {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Bytes successfully allocated since start-up
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    /// Register a held allocation until the guard is dropped
    pub fn track(self: &Arc<Self>, bytes: u64) -> AllocationGuard {
        let live = self.live.fetch_add(1, Ordering::Relaxed) + 1;
        self.live_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        metrics::gauge!("stressor_live_allocations").set(live as f64);
        metrics::counter!("stressor_allocated_bytes_total").increment(bytes);

        AllocationGuard {
            tracker: Arc::clone(self),
            bytes,
        }
    }
}

/// Releases its allocation from the tracker on drop
#[derive(Debug)]
pub struct AllocationGuard {
    tracker: Arc<AllocationTracker>,
    bytes: u64,
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        let live = self.tracker.live.fetch_sub(1, Ordering::Relaxed) - 1;
        self.tracker.live_bytes.fetch_sub(self.bytes, Ordering::Relaxed);
        metrics::gauge!("stressor_live_allocations").set(live as f64);
    }
}

/// Allocate `bytes`, touch every page, then hold the buffer for `keep`.
///
/// Returns once the buffer has been freed. Allocation failure is logged, not
/// returned.
pub async fn hold_allocation(tracker: Arc<AllocationTracker>, bytes: u64, keep: Duration) {
    let buffer = tokio::task::spawn_blocking(move || allocate_touched(bytes)).await;

    let buffer = match buffer {
        Ok(Some(buffer)) => buffer,
        Ok(None) => {
            warn!("Could not allocate {}MB of memory", to_mib(bytes));
            return;
        }
        Err(e) => {
            warn!("Allocation task failed: {}", e);
            return;
        }
    };

    let _guard = tracker.track(bytes);
    tokio::time::sleep(keep).await;

    drop(black_box(buffer));
    debug!("Released {}MB of memory", to_mib(bytes));
}

fn allocate_touched(bytes: u64) -> Option<Vec<u8>> {
    let mut buffer = try_filled(bytes, 0xA5)?;
    buffer.reverse();
    Some(buffer)
}

/// `bytes` copies of `fill`, or `None` when the memory cannot be had
fn try_filled(bytes: u64, fill: u8) -> Option<Vec<u8>> {
    let len = usize::try_from(bytes).ok()?;
    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(len).ok()?;
    buffer.resize(len, fill);
    Some(buffer)
}

/// `bytes` random bytes for a download body
pub fn random_bytes(bytes: u64) -> Result<Bytes, ServerError> {
    let mut data = try_filled(bytes, 0).ok_or(ServerError::Allocation(bytes))?;
    rand::rng().fill_bytes(&mut data);
    Ok(Bytes::from(data))
}
