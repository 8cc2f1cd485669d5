//! Growable arrays.
//!
//! An array is a traced `[length, slots]` object whose backing store
//! is a separate `Slots` buffer. Capacity is the buffer's slot count;
//! growth doubles the buffer and copies. Out-of-range reads return
//! nil.

use loam_core::{TypeTag, Value, WORD_SIZE};
use loam_gc::GcHeap;

use super::{new_slots, small_int};

/// Allocate an empty array with room for `capacity` elements.
pub fn new_array(heap: &mut GcHeap, capacity: usize) -> Value {
    let data = new_slots(heap, capacity);
    let d = heap.push_root(data);
    let array = heap.allocate(2 * WORD_SIZE);
    let data = heap.pop_root(d);
    heap.set_type(array, TypeTag::Array);
    heap.set(array, 0, small_int(0));
    heap.set(array, 1, data);
    array
}

/// Number of elements in the array.
pub fn array_len(heap: &GcHeap, array: Value) -> usize {
    debug_assert_eq!(heap.type_of(array), TypeTag::Array);
    heap.get(array, 0)
        .as_int()
        .expect("array length is an immediate") as usize
}

/// Current capacity of the backing buffer.
pub fn array_capacity(heap: &GcHeap, array: Value) -> usize {
    heap.slot_count(heap.get(array, 1))
}

/// Read element `index`, or nil when out of range.
pub fn array_get(heap: &GcHeap, array: Value, index: usize) -> Value {
    if index >= array_len(heap, array) {
        return Value::NIL;
    }
    let data = heap.get(array, 1);
    heap.get(data, index)
}

/// Write element `index`, which must be within the current length.
pub fn array_set(heap: &mut GcHeap, array: Value, index: usize, value: Value) {
    let len = array_len(heap, array);
    if index >= len {
        panic!("array index {} out of bounds for length {}", index, len);
    }
    let data = heap.get(array, 1);
    heap.set(data, index, value);
}

/// Append an element, growing the backing buffer when it is full.
///
/// The array and the value are rooted across the growth allocation.
pub fn array_push(heap: &mut GcHeap, array: Value, value: Value) {
    let len = array_len(heap, array);
    if len == array_capacity(heap, array) {
        let a = heap.push_root(array);
        let v = heap.push_root(value);
        let grown = new_slots(heap, (len * 2).max(4));
        heap.pop_root(v);
        heap.pop_root(a);
        let data = heap.get(array, 1);
        for i in 0..len {
            let element = heap.get(data, i);
            heap.set(grown, i, element);
        }
        heap.set(array, 1, grown);
    }
    let data = heap.get(array, 1);
    heap.set(data, len, value);
    heap.set(array, 0, small_int(len + 1));
}
