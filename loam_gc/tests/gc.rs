//! End-to-end heap behavior: reachability, reclamation, splitting,
//! coalescing under churn, and the root-stack protocol.

use loam_core::{TypeTag, Value, WORD_SIZE};
use loam_gc::{GcConfig, GcHeap, HEADER_SIZE};

/// Allocate a cons cell, rooting both arguments across the allocation.
fn cell(heap: &mut GcHeap, head: Value, tail: Value) -> Value {
    let h = heap.push_root(head);
    let t = heap.push_root(tail);
    let pair = heap.allocate(2 * WORD_SIZE);
    let tail = heap.pop_root(t);
    let head = heap.pop_root(h);
    heap.set(pair, 0, head);
    heap.set(pair, 1, tail);
    heap.set_type(pair, TypeTag::Pair);
    pair
}

fn int(x: i64) -> Value {
    Value::int(x).unwrap()
}

#[test]
fn collection_keeps_the_rooted_graph() {
    let mut heap = GcHeap::new(GcConfig::small());

    let a = cell(&mut heap, int(1), Value::NIL);
    let b = cell(&mut heap, int(2), a);
    let c = cell(&mut heap, int(3), b);
    let _orphan = cell(&mut heap, int(4), Value::NIL);

    let slot = heap.push_root(c);
    heap.collect();

    assert_eq!(heap.stats().live_objects, 3);
    assert_eq!(heap.stats().bytes_used, (3 * 2 * WORD_SIZE) as u64);

    // The surviving chain is intact.
    let c = heap.root_get(slot);
    assert_eq!(heap.get(c, 0).as_int(), Some(3));
    let b = heap.get(c, 1);
    assert_eq!(heap.get(b, 0).as_int(), Some(2));
    let a = heap.get(b, 1);
    assert_eq!(heap.get(a, 0).as_int(), Some(1));
    assert!(heap.get(a, 1).is_nil());
}

#[test]
fn dropping_a_root_frees_its_graph() {
    let mut heap = GcHeap::new(GcConfig::small());

    let a = cell(&mut heap, int(1), Value::NIL);
    let b = cell(&mut heap, int(2), a);
    let slot = heap.push_root(b);

    heap.collect();
    assert_eq!(heap.stats().live_objects, 2);
    let free_before = heap.stats().bytes_free;

    // Shorten the chain to just `a`; `b` becomes garbage.
    let b = heap.root_get(slot);
    let a = heap.get(b, 1);
    heap.root_set(slot, a);
    heap.collect();

    assert_eq!(heap.stats().live_objects, 1);
    assert!(heap.stats().bytes_free >= free_before + (2 * WORD_SIZE) as u64);

    // Dropping the last root reclaims everything.
    heap.pop_root(slot);
    heap.collect();
    assert_eq!(heap.stats().live_objects, 0);
    assert_eq!(heap.stats().bytes_used, 0);
}

#[test]
fn split_leaves_an_exact_remainder() {
    let mut heap = GcHeap::new(GcConfig::small());
    let block = heap.config().block_size;

    let obj = heap.allocate(64);
    let slot = heap.push_root(obj);
    heap.collect();
    heap.pop_root(slot);

    // One used chunk and one free remainder tile the first block:
    // used payload + remainder payload + two headers.
    assert_eq!(heap.stats().bytes_used, 64);
    assert_eq!(
        heap.stats().bytes_used + heap.stats().bytes_free + (2 * HEADER_SIZE) as u64,
        block as u64
    );
}

#[test]
fn churn_with_one_rooted_list_stays_bounded() {
    let mut heap = GcHeap::new(GcConfig::small());
    let slot = heap.push_root(Value::NIL);

    let mut mid_size = 0;
    for round in 0..1000 {
        // Rebuild a fresh 16-cell list each round; the old one becomes
        // garbage the moment the slot is overwritten.
        heap.root_set(slot, Value::NIL);
        for i in 0..16 {
            let prev = heap.root_get(slot);
            let next = cell(&mut heap, int(i), prev);
            heap.root_set(slot, next);
        }
        if round == 500 {
            mid_size = heap.heap_size();
        }
    }

    heap.collect();
    assert_eq!(heap.stats().live_objects, 16);
    assert_eq!(heap.stats().bytes_used, (16 * 2 * WORD_SIZE) as u64);

    // Adjacent garbage coalesces, so steady-state churn must not keep
    // growing the arena.
    assert!(heap.heap_size() <= mid_size + heap.config().block_size);
    assert!(heap.heap_size() < 64 * 1024);

    heap.pop_root(slot);
    heap.collect();
    assert_eq!(heap.stats().live_objects, 0);
    assert_eq!(heap.stats().bytes_used, 0);
}

#[test]
fn atomic_payloads_do_not_keep_aliases_alive() {
    let mut heap = GcHeap::new(GcConfig::small());

    let shroud = heap.allocate_atomic(WORD_SIZE);
    let _slot = heap.push_root(shroud);

    // Store a live object's address into the atomic payload, keeping
    // no other reference to it.
    let hidden = cell(&mut heap, int(9), Value::NIL);
    heap.set(shroud, 0, hidden);

    heap.collect();
    assert_eq!(heap.stats().live_objects, 1);
}

#[test]
#[should_panic(expected = "dead object access")]
fn stale_references_abort() {
    let mut heap = GcHeap::new(GcConfig::small());
    let orphan = cell(&mut heap, int(1), Value::NIL);
    heap.collect();
    heap.get(orphan, 0);
}

#[test]
#[should_panic(expected = "root table underflow")]
fn popping_an_empty_root_stack_aborts() {
    let mut heap = GcHeap::new(GcConfig::small());
    let slot = heap.push_root(Value::NIL);
    heap.pop_root(slot);
    heap.pop_root(slot);
}

#[test]
#[should_panic(expected = "non-lifo root")]
fn out_of_order_root_pops_abort() {
    let mut heap = GcHeap::new(GcConfig::small());
    let a = heap.push_root(Value::NIL);
    let _b = heap.push_root(Value::NIL);
    heap.pop_root(a);
}

#[test]
fn threshold_triggers_collection() {
    let mut heap = GcHeap::new(GcConfig {
        collect_threshold: 8,
        ..GcConfig::small()
    });

    for _ in 0..8 {
        heap.allocate(2 * WORD_SIZE);
    }
    assert_eq!(heap.stats().collection_count, 0);

    // The ninth allocation hits the threshold and collects first.
    heap.allocate(2 * WORD_SIZE);
    assert_eq!(heap.stats().collection_count, 1);
    assert_eq!(heap.stats().allocation_count, 9);
}

#[test]
fn explicit_collection_resets_the_threshold_counter() {
    let mut heap = GcHeap::new(GcConfig {
        collect_threshold: 8,
        ..GcConfig::small()
    });

    for _ in 0..7 {
        heap.allocate(2 * WORD_SIZE);
    }
    heap.collect();
    assert_eq!(heap.stats().collection_count, 1);

    // The counter restarted, so the next few allocations stay quiet.
    for _ in 0..7 {
        heap.allocate(2 * WORD_SIZE);
    }
    assert_eq!(heap.stats().collection_count, 1);
}

#[test]
fn rooted_values_survive_allocation_pressure() {
    let mut heap = GcHeap::new(GcConfig {
        collect_threshold: 16,
        ..GcConfig::small()
    });

    let keeper = cell(&mut heap, int(7), Value::NIL);
    let slot = heap.push_root(keeper);

    // Enough garbage to force several automatic collections.
    for i in 0..200 {
        cell(&mut heap, int(i), Value::NIL);
    }

    let keeper = heap.pop_root(slot);
    assert_eq!(heap.get(keeper, 0).as_int(), Some(7));
    assert!(heap.stats().collection_count >= 1);
}

#[test]
fn independent_heaps_do_not_interfere() {
    let mut first = GcHeap::new(GcConfig::small());
    let mut second = GcHeap::new(GcConfig::small());

    let a = cell(&mut first, int(1), Value::NIL);
    let _slot = first.push_root(a);
    second.collect();

    // Collecting the empty heap must not disturb the other.
    assert_eq!(first.get(a, 0).as_int(), Some(1));
    assert_eq!(second.stats().live_objects, 0);
}
