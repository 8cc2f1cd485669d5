//! Heap behavior under the object layer: list churn with a single
//! rooted head, mixed object graphs, and reclamation after the last
//! root goes away.

use loam_core::{TypeTag, Value, WORD_SIZE};
use loam_gc::{GcConfig, GcHeap};
use loam_runtime::{
    array_push, head, long_value, new_array, new_long, new_pair, new_string, new_symbol,
    string_bytes, tail,
};

/// Build a list (n, n-1, .., 1) with the working cell rooted, the way
/// an evaluator would.
fn make_list(heap: &mut GcHeap, n: i64) -> Value {
    let slot = heap.push_root(Value::NIL);
    for i in 1..=n {
        let prev = heap.root_get(slot);
        let cell = new_pair(heap, Value::int(i).unwrap(), prev);
        heap.root_set(slot, cell);
    }
    heap.pop_root(slot)
}

#[test]
fn list_churn_with_one_root() {
    let mut heap = GcHeap::new(GcConfig::small());
    let slot = heap.push_root(Value::NIL);

    // Each new list strands the previous one.
    for _ in 0..100 {
        let list = make_list(&mut heap, 256);
        heap.root_set(slot, list);
    }

    heap.collect();
    assert_eq!(heap.stats().live_objects, 256);
    assert_eq!(heap.stats().bytes_used, (256 * 2 * WORD_SIZE) as u64);

    // The surviving list still reads back in order.
    let mut cursor = heap.root_get(slot);
    let mut expected = 256;
    while !cursor.is_nil() {
        assert_eq!(head(&heap, cursor).as_int(), Some(expected));
        expected -= 1;
        cursor = tail(&heap, cursor);
    }
    assert_eq!(expected, 0);

    heap.pop_root(slot);
    heap.collect();
    assert_eq!(heap.stats().live_objects, 0);
    assert_eq!(heap.stats().bytes_used, 0);
}

#[test]
fn mixed_graphs_survive_collection() {
    let mut heap = GcHeap::new(GcConfig::small());

    // (sym . [wide-long, "text"])
    let array = new_array(&mut heap, 2);
    let a = heap.push_root(array);
    let wide = new_long(&mut heap, (i64::MAX >> 1) + 25);
    array_push(&mut heap, array, wide);
    let text = new_string(&mut heap, "persistent");
    array_push(&mut heap, array, text);

    let sym = new_symbol(&mut heap, "root");
    let pair = new_pair(&mut heap, sym, array);
    heap.pop_root(a);
    let slot = heap.push_root(pair);

    heap.collect();
    // pair + symbol + name buffer + array + slots + boxed long +
    // string + string buffer.
    assert_eq!(heap.stats().live_objects, 8);

    let pair = heap.root_get(slot);
    assert_eq!(heap.type_of(head(&heap, pair)), TypeTag::Symbol);
    assert_eq!(string_bytes(&heap, head(&heap, pair)), b"root");

    let array = tail(&heap, pair);
    assert_eq!(
        long_value(&heap, loam_runtime::array_get(&heap, array, 0)),
        (i64::MAX >> 1) + 25
    );
    assert_eq!(
        string_bytes(&heap, loam_runtime::array_get(&heap, array, 1)),
        b"persistent"
    );
}

#[test]
fn automatic_collections_during_list_building() {
    let mut heap = GcHeap::new(GcConfig {
        collect_threshold: 64,
        ..GcConfig::small()
    });

    let list = make_list(&mut heap, 500);
    let slot = heap.push_root(list);
    assert!(heap.stats().collection_count >= 1);

    // Nothing was lost to the automatic collections.
    let mut count = 0;
    let mut cursor = heap.root_get(slot);
    while !cursor.is_nil() {
        count += 1;
        cursor = tail(&heap, cursor);
    }
    assert_eq!(count, 500);
}
