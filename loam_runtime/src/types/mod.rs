//! Object layouts and constructors.
//!
//! Traced objects are arrays of value slots; byte payloads always live
//! in a separate atomic `Data` buffer referenced by a traced owner.

mod array;
mod long;
mod pair;
mod string;

pub use array::{array_capacity, array_get, array_len, array_push, array_set, new_array};
pub use long::{is_long, long_value, new_long};
pub use pair::{head, new_pair, set_head, set_tail, tail};
pub use string::{new_string, new_symbol, string_bytes, string_len};

use loam_core::{TypeTag, Value, WORD_SIZE};
use loam_gc::GcHeap;

/// Allocate an atomic byte buffer holding a copy of `bytes`.
pub fn new_data(heap: &mut GcHeap, bytes: &[u8]) -> Value {
    let data = heap.allocate_atomic(bytes.len());
    heap.set_type(data, TypeTag::Data);
    heap.bytes_mut(data)[..bytes.len()].copy_from_slice(bytes);
    data
}

/// Allocate a traced buffer of `count` value slots, all nil.
pub fn new_slots(heap: &mut GcHeap, count: usize) -> Value {
    let slots = heap.allocate(count * WORD_SIZE);
    heap.set_type(slots, TypeTag::Slots);
    slots
}

/// Encode a length as an immediate integer.
pub(crate) fn small_int(n: usize) -> Value {
    Value::int(n as i64).expect("length fits the immediate encoding")
}
