//! Block pool: the circular chunk chain and its free-list allocator.
//!
//! The pool owns one contiguous arena of words. Blocks obtained from
//! the underlying allocator are appended to the arena and formatted as
//! a single free chunk each, so chunk addresses are plain byte offsets
//! and chunk links never dangle. Allocation is next-fit: the scan
//! resumes at the chunk after the most recent allocation, merging
//! physically adjacent free chunks as it goes and splitting the winner
//! when it is larger than needed.

use rustc_hash::FxHashSet;

use loam_core::WORD_SIZE;

use super::align_up;
use super::chunk::{
    ChunkFlags, HEADER_SIZE, OFF_FLAGS, OFF_NEXT, OFF_SIZE, OFF_TYPE, WORD_SHIFT,
};

/// Arena address of the first chunk header.
pub(crate) const POOL_BASE: usize = 0;

/// The block pool and free-list allocator.
///
/// All addresses taken and returned are byte offsets into the arena.
/// The pool never interprets payloads; it only formats, links, splits
/// and merges chunks.
pub(crate) struct BlockPool {
    /// Word arena backing every block.
    arena: Vec<usize>,
    /// Rotating next-fit cursor: the last chunk allocated or merged.
    cursor: usize,
    /// Allocations since the last collection.
    alloc_count: u32,
    /// Minimum size of a freshly grown block.
    block_size: usize,
}

impl BlockPool {
    /// Create a pool with one free block of `block_size` bytes.
    pub(crate) fn new(block_size: usize) -> Self {
        let mut pool = BlockPool {
            arena: Vec::new(),
            cursor: POOL_BASE,
            alloc_count: 0,
            block_size,
        };
        pool.grow(0);
        pool
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Read the word at a byte address.
    #[inline]
    pub(crate) fn word(&self, addr: usize) -> usize {
        self.arena[addr >> WORD_SHIFT]
    }

    /// Write the word at a byte address.
    #[inline]
    pub(crate) fn set_word(&mut self, addr: usize, value: usize) {
        self.arena[addr >> WORD_SHIFT] = value;
    }

    /// Payload size in bytes of the chunk at `chunk`.
    #[inline]
    pub(crate) fn size(&self, chunk: usize) -> usize {
        self.arena[(chunk >> WORD_SHIFT) + OFF_SIZE]
    }

    #[inline]
    fn set_size(&mut self, chunk: usize, size: usize) {
        self.arena[(chunk >> WORD_SHIFT) + OFF_SIZE] = size;
    }

    /// Flag bits of the chunk at `chunk`.
    #[inline]
    pub(crate) fn flags(&self, chunk: usize) -> ChunkFlags {
        ChunkFlags::from_bits_truncate(self.arena[(chunk >> WORD_SHIFT) + OFF_FLAGS])
    }

    #[inline]
    pub(crate) fn set_flags(&mut self, chunk: usize, flags: ChunkFlags) {
        self.arena[(chunk >> WORD_SHIFT) + OFF_FLAGS] = flags.bits();
    }

    /// Chain successor of the chunk at `chunk`.
    #[inline]
    pub(crate) fn next(&self, chunk: usize) -> usize {
        self.arena[(chunk >> WORD_SHIFT) + OFF_NEXT]
    }

    #[inline]
    fn set_next(&mut self, chunk: usize, next: usize) {
        self.arena[(chunk >> WORD_SHIFT) + OFF_NEXT] = next;
    }

    /// Host type tag of the chunk at `chunk`.
    #[inline]
    pub(crate) fn tag(&self, chunk: usize) -> u32 {
        self.arena[(chunk >> WORD_SHIFT) + OFF_TYPE] as u32
    }

    #[inline]
    pub(crate) fn set_tag(&mut self, chunk: usize, tag: u32) {
        self.arena[(chunk >> WORD_SHIFT) + OFF_TYPE] = tag as usize;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Total arena size in bytes.
    #[inline]
    pub(crate) fn arena_bytes(&self) -> usize {
        self.arena.len() << WORD_SHIFT
    }

    /// The backing word arena.
    #[inline]
    pub(crate) fn words(&self) -> &[usize] {
        &self.arena
    }

    /// The backing word arena, mutable.
    #[inline]
    pub(crate) fn words_mut(&mut self) -> &mut [usize] {
        &mut self.arena
    }

    /// Whether `addr` could be a payload address in this arena.
    #[inline]
    pub(crate) fn contains_payload(&self, addr: usize) -> bool {
        addr >= HEADER_SIZE && addr <= self.arena_bytes() && addr % WORD_SIZE == 0
    }

    /// Allocations since the last collection.
    #[inline]
    pub(crate) fn alloc_count(&self) -> u32 {
        self.alloc_count
    }

    /// Reset the allocation counter after a collection.
    #[inline]
    pub(crate) fn reset_alloc_count(&mut self) {
        self.alloc_count = 0;
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a chunk with a zeroed payload of `size` bytes.
    ///
    /// `size` must already be word-aligned. Returns the payload
    /// address. Grows the pool when no chunk fits; growth failure is
    /// fatal.
    pub(crate) fn allocate(&mut self, size: usize) -> usize {
        debug_assert_eq!(size % WORD_SIZE, 0);
        loop {
            if let Some(payload) = self.scan(size) {
                return payload;
            }
            self.grow(size);
        }
    }

    /// One next-fit pass over the chunk chain.
    ///
    /// A free chunk is usable on an exact fit, or when it is strictly
    /// larger than the request plus a header so the split remainder
    /// keeps at least one payload word. Returns `None` after a full
    /// loop without a fit.
    fn scan(&mut self, size: usize) -> Option<usize> {
        let ssize = size + HEADER_SIZE;
        let mut anchor = self.next(self.cursor);
        let mut chunk = anchor;
        loop {
            if self.flags(chunk).is_empty() {
                let mut csize = self.size(chunk);
                // Merge every free chunk that directly follows in memory.
                loop {
                    let next = self.next(chunk);
                    if next != chunk + HEADER_SIZE + csize || !self.flags(next).is_empty() {
                        break;
                    }
                    self.set_next(chunk, self.next(next));
                    csize += HEADER_SIZE + self.size(next);
                    self.set_size(chunk, csize);
                    if next == self.cursor {
                        self.cursor = chunk;
                    }
                    if next == anchor {
                        // The chunk the scan started from was merged away;
                        // the surviving chunk stands in for it.
                        anchor = chunk;
                    }
                }
                if csize == size || csize > ssize {
                    if csize > ssize {
                        let split = chunk + ssize;
                        self.set_size(split, csize - ssize);
                        self.set_flags(split, ChunkFlags::empty());
                        self.set_tag(split, 0);
                        self.set_next(split, self.next(chunk));
                        self.set_size(chunk, size);
                        self.set_next(chunk, split);
                        log::trace!(
                            "split chunk {:#x}: {} used, {} left over",
                            chunk,
                            size,
                            csize - ssize
                        );
                    }
                    self.set_flags(chunk, ChunkFlags::USED);
                    self.set_tag(chunk, 0);
                    self.cursor = chunk;
                    let payload = chunk + HEADER_SIZE;
                    self.fill_zero(payload, size);
                    self.alloc_count += 1;
                    log::trace!("alloc {} bytes at {:#x}", size, payload);
                    return Some(payload);
                }
            }
            chunk = self.next(chunk);
            if chunk == anchor {
                return None;
            }
        }
    }

    /// Append a fresh block and splice it into the chain after the
    /// cursor.
    ///
    /// The block is sized so that it can satisfy a pending request of
    /// `request` payload bytes on its own, with room to split.
    fn grow(&mut self, request: usize) {
        let min_block = request + 2 * HEADER_SIZE + WORD_SIZE;
        let bytes = align_up(self.block_size.max(min_block), WORD_SIZE);
        let words = bytes >> WORD_SHIFT;
        if self.arena.try_reserve(words).is_err() {
            panic!("out of memory");
        }
        let chunk = self.arena_bytes();
        let len = self.arena.len();
        self.arena.resize(len + words, 0);
        self.set_size(chunk, bytes - HEADER_SIZE);
        // Flag and tag words of the new header are already zero.
        if chunk == POOL_BASE {
            self.set_next(chunk, POOL_BASE);
        } else {
            let after = self.next(self.cursor);
            self.set_next(chunk, after);
            self.set_next(self.cursor, chunk);
        }
        log::trace!("pool grew by {} bytes to {}", bytes, self.arena_bytes());
    }

    /// Zero a payload range.
    fn fill_zero(&mut self, addr: usize, len: usize) {
        let start = addr >> WORD_SHIFT;
        let end = start + (len >> WORD_SHIFT);
        self.arena[start..end].fill(0);
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Check the structural invariants of the chunk chain.
    ///
    /// Panics on any violation: a chain that is not a single cycle,
    /// sizes that do not tile the arena, or a mark bit surviving
    /// outside a collection cycle.
    pub(crate) fn verify(&self) {
        let total = self.arena_bytes();
        let mut seen = FxHashSet::default();
        let mut chunk = POOL_BASE;
        loop {
            assert!(seen.insert(chunk), "chunk chain revisits {:#x}", chunk);
            let size = self.size(chunk);
            assert_eq!(size % WORD_SIZE, 0, "chunk {:#x} has unaligned size", chunk);
            assert!(
                chunk + HEADER_SIZE + size <= total,
                "chunk {:#x} overruns the arena",
                chunk
            );
            assert!(
                !self.flags(chunk).contains(ChunkFlags::MARK),
                "mark bit set outside a collection at {:#x}",
                chunk
            );
            chunk = self.next(chunk);
            if chunk == POOL_BASE {
                break;
            }
        }
        // Walking the arena by size gaps must find exactly the chunks
        // on the chain.
        let mut addr = POOL_BASE;
        let mut tiled = 0usize;
        while addr < total {
            assert!(seen.contains(&addr), "chunk {:#x} missing from the chain", addr);
            tiled += 1;
            addr += HEADER_SIZE + self.size(addr);
        }
        assert_eq!(addr, total, "chunk sizes do not tile the arena");
        assert_eq!(tiled, seen.len(), "chain names chunks outside the arena");
    }
}
