//! Chunk header layout.
//!
//! Every allocation in the pool is a chunk: a four-word header followed
//! by the payload. Chunks, free and used alike, are linked into one
//! circular chain through the header's `next` field, and chunk sizes
//! always agree with the physical gap to the following chunk, so the
//! chain doubles as a complete map of the arena.
//!
//! Header fields, one word each:
//!
//! | offset | field   | contents                                  |
//! |--------|---------|-------------------------------------------|
//! | 0      | `size`  | payload size in bytes, word-aligned       |
//! | 1      | `flags` | [`ChunkFlags`] bits                       |
//! | 2      | `next`  | arena address of the next chunk header    |
//! | 3      | `type`  | opaque host tag, ignored by the collector |

use bitflags::bitflags;
use loam_core::WORD_SIZE;

/// Size of a chunk header in bytes (four word-sized fields).
pub const HEADER_SIZE: usize = 4 * WORD_SIZE;

/// Shift converting a byte address to a word index.
pub(crate) const WORD_SHIFT: u32 = WORD_SIZE.trailing_zeros();

/// Word offset of the `size` field within a header.
pub(crate) const OFF_SIZE: usize = 0;
/// Word offset of the `flags` field within a header.
pub(crate) const OFF_FLAGS: usize = 1;
/// Word offset of the `next` field within a header.
pub(crate) const OFF_NEXT: usize = 2;
/// Word offset of the `type` field within a header.
pub(crate) const OFF_TYPE: usize = 3;

bitflags! {
    /// Per-chunk flag bits stored in the header's `flags` word.
    ///
    /// A free chunk has no bits set. `MARK` is transient: the tracer
    /// sets it and the following sweep clears it, so outside a
    /// collection cycle it is never set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChunkFlags: usize {
        /// Chunk holds a live allocation.
        const USED = 1 << 0;
        /// Payload holds no outgoing references; the tracer skips it.
        const ATOMIC = 1 << 1;
        /// Reachability bit for the current collection cycle.
        const MARK = 1 << 2;
    }
}
