//! Heap statistics.
//!
//! Counters are plain fields: the runtime is single-threaded by
//! contract, so there is nothing to synchronize. Usage figures
//! (`bytes_used`, `bytes_free`, `live_objects`) are refreshed by each
//! sweep; the allocation totals accumulate for the life of the heap.

use std::time::Duration;

use crate::collector::CollectResult;

/// Statistics about allocation and collection activity.
#[derive(Debug, Default, Clone)]
pub struct GcStats {
    /// Live payload bytes, as of the last collection.
    pub bytes_used: u64,
    /// Free payload bytes, as of the last collection.
    pub bytes_free: u64,
    /// Live objects, as of the last collection.
    pub live_objects: u64,
    /// Total allocations since the heap was created.
    pub allocation_count: u64,
    /// Total payload bytes allocated since the heap was created.
    pub bytes_allocated: u64,
    /// Collections since the heap was created.
    pub collection_count: u64,
    /// Total time spent collecting.
    pub gc_time: Duration,
}

impl GcStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one allocation of `size` payload bytes.
    #[inline]
    pub fn record_allocation(&mut self, size: usize) {
        self.allocation_count += 1;
        self.bytes_allocated += size as u64;
    }

    /// Record one finished collection cycle.
    pub fn record_collection(&mut self, duration: Duration, result: &CollectResult) {
        self.collection_count += 1;
        self.gc_time += duration;
        self.bytes_used = result.live_bytes as u64;
        self.bytes_free = result.free_bytes as u64;
        self.live_objects = result.live_objects as u64;
    }

    /// Average collection pause.
    pub fn avg_pause(&self) -> Duration {
        if self.collection_count == 0 {
            return Duration::ZERO;
        }
        self.gc_time / self.collection_count as u32
    }

    /// Print a summary to stderr.
    pub fn print_summary(&self) {
        eprintln!("=== Heap Statistics ===");
        eprintln!(
            "Allocations: {} objects, {}",
            self.allocation_count,
            format_bytes(self.bytes_allocated)
        );
        eprintln!(
            "Live: {} objects, {} used, {} free",
            self.live_objects,
            format_bytes(self.bytes_used),
            format_bytes(self.bytes_free)
        );
        eprintln!(
            "Collections: {} ({:?} total, {:?} avg pause)",
            self.collection_count,
            self.gc_time,
            self.avg_pause()
        );
    }
}

/// Format bytes in human-readable form.
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
