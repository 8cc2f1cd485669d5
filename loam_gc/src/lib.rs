//! Loam garbage collector.
//!
//! A mark-and-sweep heap for a tagged-value object runtime: free-list
//! allocation with splitting and coalescing over a circular chunk
//! chain, an explicit LIFO root stack, and a stop-the-world collector
//! driven from an allocation-count threshold.
//!
//! # Architecture
//!
//! - **Block pool**: one contiguous arena, grown a block at a time.
//!   Every chunk (free or used) carries a four-word header and is
//!   linked into a single circular chain.
//! - **Allocator**: next-fit from a rotating cursor, merging adjacent
//!   free chunks on the way and splitting oversized ones.
//! - **Root stack**: explicitly registered slots, pushed and popped in
//!   strict LIFO order around every call that can allocate.
//! - **Collector**: worklist-based mark and trace from the roots,
//!   followed by one sweep over the chain. Atomic objects are marked
//!   but never scanned.
//!
//! # Usage
//!
//! ```ignore
//! use loam_core::Value;
//! use loam_gc::GcHeap;
//!
//! let mut heap = GcHeap::with_defaults();
//!
//! let pair = heap.allocate(16);
//! let slot = heap.push_root(pair);
//! let other = heap.allocate(16); // may collect; `pair` is safe
//! let pair = heap.pop_root(slot);
//! heap.set(pair, 0, other);
//! ```
//!
//! # Failure model
//!
//! Root-protocol violations, stale references and allocation failure
//! are programmer errors and abort with a diagnostic. The only
//! recoverable error surface is configuration validation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collector;
pub mod config;
pub mod heap;
pub mod roots;

mod stats;

pub use collector::CollectResult;
pub use config::{ConfigError, GcConfig};
pub use heap::chunk::{ChunkFlags, HEADER_SIZE};
pub use heap::{align_up, GcHeap};
pub use roots::{RootSlot, RootStack};
pub use stats::GcStats;
