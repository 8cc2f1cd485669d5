//! The heap context.
//!
//! [`GcHeap`] is the one value holding all runtime state: the block
//! pool, the root stack, the collector's scratch space, statistics and
//! configuration. There are no hidden globals; independent heaps can
//! coexist, and dropping a heap releases everything it owns.

pub mod chunk;
pub(crate) mod pool;

use std::time::Instant;

use loam_core::{TypeTag, Value, WORD_SIZE};

use crate::collector::Collector;
use crate::config::GcConfig;
use crate::roots::{RootSlot, RootStack};
use crate::stats::GcStats;
use self::chunk::{ChunkFlags, HEADER_SIZE, WORD_SHIFT};
use self::pool::BlockPool;

/// A garbage-collected heap.
///
/// Objects are allocated with [`allocate`](GcHeap::allocate) and
/// [`allocate_atomic`](GcHeap::allocate_atomic) and addressed by
/// [`Value`]s. The heap never moves objects; a reference stays valid
/// until a collection finds it unreachable. Any local reference that
/// must survive a call that can allocate has to be registered through
/// [`push_root`](GcHeap::push_root) first.
///
/// All payload access goes through the heap and is bounds-checked;
/// misuse (stale references, out-of-range slots, root-protocol
/// violations) panics rather than corrupting the arena.
pub struct GcHeap {
    /// Configuration parameters.
    config: GcConfig,
    /// The block pool and free-list allocator.
    pool: BlockPool,
    /// Registered roots.
    roots: RootStack,
    /// Collector scratch state.
    collector: Collector,
    /// Activity counters.
    stats: GcStats,
}

impl GcHeap {
    /// Create a heap with the given configuration.
    pub fn new(config: GcConfig) -> Self {
        config.validate().expect("invalid heap configuration");
        let pool = BlockPool::new(config.block_size);
        Self {
            config,
            pool,
            roots: RootStack::new(),
            collector: Collector::new(),
            stats: GcStats::new(),
        }
    }

    /// Create a heap with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GcConfig::default())
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate an object with `size` payload bytes, zero-filled.
    ///
    /// The size is rounded up to word alignment, and the payload is
    /// traced as an array of value slots. May run a full collection
    /// first when the allocation threshold has been reached, so every
    /// live local reference must be rooted across this call.
    pub fn allocate(&mut self, size: usize) -> Value {
        self.allocate_impl(size, false)
    }

    /// Allocate an object whose payload is never traced.
    ///
    /// For byte payloads (strings, raw buffers, boxed numbers) that
    /// must not be interpreted as references.
    pub fn allocate_atomic(&mut self, size: usize) -> Value {
        self.allocate_impl(size, true)
    }

    fn allocate_impl(&mut self, size: usize, atomic: bool) -> Value {
        let size = align_up(size, WORD_SIZE);
        if self.pool.alloc_count() == self.config.collect_threshold {
            self.collect();
        }
        let payload = self.pool.allocate(size);
        if atomic {
            let chunk = payload - HEADER_SIZE;
            let flags = self.pool.flags(chunk);
            self.pool.set_flags(chunk, flags | ChunkFlags::ATOMIC);
        }
        self.stats.record_allocation(size);
        Value::from_addr(payload)
    }

    // =========================================================================
    // Roots
    // =========================================================================

    /// Register `value` as a root and return its slot.
    ///
    /// The slot, not the pushed value, is what the collector reads:
    /// reassigning through [`root_set`](GcHeap::root_set) keeps the
    /// new value live instead.
    pub fn push_root(&mut self, value: Value) -> RootSlot {
        self.roots.push(value)
    }

    /// Deregister the most recently pushed root and return its value.
    ///
    /// Roots must be popped in exact reverse push order; violations
    /// abort.
    pub fn pop_root(&mut self, slot: RootSlot) -> Value {
        self.roots.pop(slot)
    }

    /// Read a rooted value.
    #[inline]
    pub fn root_get(&self, slot: RootSlot) -> Value {
        self.roots.get(slot)
    }

    /// Replace a rooted value.
    #[inline]
    pub fn root_set(&mut self, slot: RootSlot, value: Value) {
        self.roots.set(slot, value)
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Run a full mark-and-sweep collection now.
    pub fn collect(&mut self) {
        let start = Instant::now();
        let result = self.collector.collect(&mut self.pool, &self.roots);
        self.stats.record_collection(start.elapsed(), &result);
        if self.config.verify_heap {
            self.pool.verify();
        }
        log::debug!(
            "gc: {} objects live, {} bytes used, {} bytes free",
            result.live_objects,
            result.live_bytes,
            result.free_bytes
        );
    }

    /// Check the structural invariants of the chunk chain, panicking
    /// on any violation.
    pub fn verify(&self) {
        self.pool.verify();
    }

    // =========================================================================
    // Payload access
    // =========================================================================

    /// Read slot `index` of a traced payload.
    pub fn get(&self, object: Value, index: usize) -> Value {
        let chunk = self.chunk_of(object);
        self.check_slot(chunk, index);
        Value::from_raw(self.pool.word(chunk + HEADER_SIZE + (index << WORD_SHIFT)))
    }

    /// Write slot `index` of a payload.
    pub fn set(&mut self, object: Value, index: usize, value: Value) {
        let chunk = self.chunk_of(object);
        self.check_slot(chunk, index);
        self.pool
            .set_word(chunk + HEADER_SIZE + (index << WORD_SHIFT), value.raw());
    }

    /// Number of value slots in a payload.
    pub fn slot_count(&self, object: Value) -> usize {
        self.pool.size(self.chunk_of(object)) >> WORD_SHIFT
    }

    /// Payload size in bytes, as rounded at allocation time.
    pub fn payload_size(&self, object: Value) -> usize {
        self.pool.size(self.chunk_of(object))
    }

    /// View a payload as raw bytes.
    pub fn bytes(&self, object: Value) -> &[u8] {
        let chunk = self.chunk_of(object);
        let size = self.pool.size(chunk);
        let start = (chunk + HEADER_SIZE) >> WORD_SHIFT;
        let words = &self.pool.words()[start..start + (size >> WORD_SHIFT)];
        // SAFETY: the payload words are plain initialized memory and
        // u8 has no alignment requirement.
        unsafe { std::slice::from_raw_parts(words.as_ptr().cast::<u8>(), size) }
    }

    /// View a payload as mutable raw bytes.
    ///
    /// Intended for atomic payloads. Writing arbitrary bytes into a
    /// traced payload puts non-value words in front of the tracer.
    pub fn bytes_mut(&mut self, object: Value) -> &mut [u8] {
        let chunk = self.chunk_of(object);
        let size = self.pool.size(chunk);
        let start = (chunk + HEADER_SIZE) >> WORD_SHIFT;
        let words = &mut self.pool.words_mut()[start..start + (size >> WORD_SHIFT)];
        // SAFETY: as in `bytes`, plus exclusive access through &mut self.
        unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr().cast::<u8>(), size) }
    }

    /// The type tag of a value.
    ///
    /// Nil is `Undefined` and immediate integers are `Long`; heap
    /// references report their header tag.
    pub fn type_of(&self, value: Value) -> TypeTag {
        if value.is_nil() {
            TypeTag::Undefined
        } else if value.is_int() {
            TypeTag::Long
        } else {
            TypeTag::from_raw(self.pool.tag(self.chunk_of(value)))
        }
    }

    /// Set the type tag of a heap object.
    pub fn set_type(&mut self, object: Value, tag: TypeTag) {
        let chunk = self.chunk_of(object);
        self.pool.set_tag(chunk, tag.raw());
    }

    /// Whether a heap object was allocated atomic.
    pub fn is_atomic(&self, object: Value) -> bool {
        self.pool
            .flags(self.chunk_of(object))
            .contains(ChunkFlags::ATOMIC)
    }

    // =========================================================================
    // Observability
    // =========================================================================

    /// Activity counters, refreshed by each collection.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// The configuration this heap was created with.
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Total arena size in bytes, headers included.
    pub fn heap_size(&self) -> usize {
        self.pool.arena_bytes()
    }

    /// Number of registered roots.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Resolve a reference value to its chunk header, panicking on
    /// anything that is not a live heap object.
    fn chunk_of(&self, object: Value) -> usize {
        let addr = match object.addr() {
            Some(addr) => addr,
            None => panic!("not a heap reference: {:?}", object),
        };
        if !self.pool.contains_payload(addr) {
            panic!("invalid heap reference {:#x}", addr);
        }
        let chunk = addr - HEADER_SIZE;
        if !self.pool.flags(chunk).contains(ChunkFlags::USED) {
            panic!("dead object access at {:#x}", addr);
        }
        chunk
    }

    /// Bounds-check a slot index against a chunk's payload.
    fn check_slot(&self, chunk: usize, index: usize) {
        let slots = self.pool.size(chunk) >> WORD_SHIFT;
        if index >= slots {
            panic!("slot {} out of bounds for {}-slot object", index, slots);
        }
    }
}

/// Align a size up to the given alignment.
#[inline]
pub const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}
