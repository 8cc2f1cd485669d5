//! Cons cells.

use loam_core::{TypeTag, Value, WORD_SIZE};
use loam_gc::GcHeap;

/// Allocate a pair of `head` and `tail`.
///
/// Both arguments are rooted across the allocation, so this is safe to
/// call even when it triggers a collection.
pub fn new_pair(heap: &mut GcHeap, head: Value, tail: Value) -> Value {
    let h = heap.push_root(head);
    let t = heap.push_root(tail);
    let pair = heap.allocate(2 * WORD_SIZE);
    let tail = heap.pop_root(t);
    let head = heap.pop_root(h);
    heap.set_type(pair, TypeTag::Pair);
    heap.set(pair, 0, head);
    heap.set(pair, 1, tail);
    pair
}

/// First element of a pair.
pub fn head(heap: &GcHeap, pair: Value) -> Value {
    debug_assert_eq!(heap.type_of(pair), TypeTag::Pair);
    heap.get(pair, 0)
}

/// Second element of a pair.
pub fn tail(heap: &GcHeap, pair: Value) -> Value {
    debug_assert_eq!(heap.type_of(pair), TypeTag::Pair);
    heap.get(pair, 1)
}

/// Replace the first element of a pair.
pub fn set_head(heap: &mut GcHeap, pair: Value, value: Value) {
    debug_assert_eq!(heap.type_of(pair), TypeTag::Pair);
    heap.set(pair, 0, value);
}

/// Replace the second element of a pair.
pub fn set_tail(heap: &mut GcHeap, pair: Value, value: Value) {
    debug_assert_eq!(heap.type_of(pair), TypeTag::Pair);
    heap.set(pair, 1, value);
}
