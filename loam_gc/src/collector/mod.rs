//! Mark-and-trace plus sweep.
//!
//! A collection cycle has two total phases:
//!
//! 1. **Mark/trace**: every registered root is traced. Reaching a
//!    chunk sets its mark bit; non-atomic payloads are treated as
//!    arrays of value slots and their references queued on an explicit
//!    worklist, so arbitrarily deep and cyclic graphs trace in
//!    constant stack space. Tracing stops at nil, at immediates and at
//!    already-marked chunks.
//! 2. **Sweep**: one pass over the circular chunk chain. Marked chunks
//!    survive with their mark cleared; everything else has its flags
//!    reset to free. Freed chunks stay in place and merge with their
//!    neighbours lazily, during later allocation scans.
//!
//! Tracing an unallocated chunk means a root was missing while its
//! object was collected, or a payload holds a stale reference. That is
//! a protocol violation by the host and aborts with a diagnostic.

use std::collections::VecDeque;

use loam_core::Value;

use crate::heap::chunk::{ChunkFlags, HEADER_SIZE, WORD_SHIFT};
use crate::heap::pool::{BlockPool, POOL_BASE};
use crate::roots::RootStack;

/// Totals from one collection cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectResult {
    /// Payload bytes in chunks that survived the sweep.
    pub live_bytes: usize,
    /// Payload bytes in free chunks after the sweep.
    pub free_bytes: usize,
    /// Number of chunks that survived the sweep.
    pub live_objects: usize,
}

/// The mark-and-sweep collector.
///
/// Holds only scratch state; the worklist capacity is retained across
/// cycles.
pub struct Collector {
    /// Marked chunks whose payload slots still need scanning.
    worklist: VecDeque<usize>,
}

impl Collector {
    /// Create a collector.
    pub fn new() -> Self {
        Collector {
            worklist: VecDeque::with_capacity(256),
        }
    }

    /// Run one full collection cycle over `pool` from `roots`.
    pub(crate) fn collect(&mut self, pool: &mut BlockPool, roots: &RootStack) -> CollectResult {
        self.worklist.clear();

        // Phase 1: mark from the roots, then drain the worklist.
        for value in roots.iter() {
            self.mark(pool, value);
        }
        while let Some(chunk) = self.worklist.pop_front() {
            let payload = chunk + HEADER_SIZE;
            let slots = pool.size(chunk) >> WORD_SHIFT;
            for i in 0..slots {
                let value = Value::from_raw(pool.word(payload + (i << WORD_SHIFT)));
                self.mark(pool, value);
            }
        }

        // Phase 2: sweep the whole chain.
        let result = self.sweep(pool);
        pool.reset_alloc_count();
        result
    }

    /// Mark one value, queueing its payload for scanning when it is a
    /// live, non-atomic object.
    fn mark(&mut self, pool: &mut BlockPool, value: Value) {
        let addr = match value.addr() {
            Some(addr) => addr,
            None => return,
        };
        if !pool.contains_payload(addr) {
            panic!("invalid heap reference {:#x}", addr);
        }
        let chunk = addr - HEADER_SIZE;
        let flags = pool.flags(chunk);
        if !flags.contains(ChunkFlags::USED) {
            panic!("attempt to mark dead object");
        }
        if flags.contains(ChunkFlags::MARK) {
            return;
        }
        pool.set_flags(chunk, flags | ChunkFlags::MARK);
        if !flags.contains(ChunkFlags::ATOMIC) {
            self.worklist.push_back(chunk);
        }
    }

    /// Reclaim every unmarked chunk and clear the marks that remain.
    fn sweep(&mut self, pool: &mut BlockPool) -> CollectResult {
        let mut result = CollectResult::default();
        let mut chunk = POOL_BASE;
        loop {
            let flags = pool.flags(chunk);
            if flags.contains(ChunkFlags::MARK) {
                result.live_bytes += pool.size(chunk);
                result.live_objects += 1;
                pool.set_flags(chunk, flags.difference(ChunkFlags::MARK));
            } else {
                result.free_bytes += pool.size(chunk);
                pool.set_flags(chunk, ChunkFlags::empty());
            }
            chunk = pool.next(chunk);
            if chunk == POOL_BASE {
                break;
            }
        }
        result
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
