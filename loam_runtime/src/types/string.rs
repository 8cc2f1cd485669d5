//! Strings and symbols.
//!
//! Both are a traced two-slot object, `[length, buffer]`, where the
//! buffer is an atomic `Data` object. Keeping the bytes atomic means
//! arbitrary content can never be mistaken for references, and keeping
//! the owner traced keeps the buffer alive.

use loam_core::{TypeTag, Value, WORD_SIZE};
use loam_gc::GcHeap;

use super::{new_data, small_int};

fn new_text(heap: &mut GcHeap, tag: TypeTag, bytes: &[u8]) -> Value {
    let data = new_data(heap, bytes);
    let d = heap.push_root(data);
    let text = heap.allocate(2 * WORD_SIZE);
    let data = heap.pop_root(d);
    heap.set_type(text, tag);
    heap.set(text, 0, small_int(bytes.len()));
    heap.set(text, 1, data);
    text
}

/// Allocate a string holding a copy of `content`.
pub fn new_string(heap: &mut GcHeap, content: &str) -> Value {
    new_text(heap, TypeTag::String, content.as_bytes())
}

/// Allocate a symbol with the given name.
///
/// Interning is the evaluator's concern; every call makes a fresh
/// object.
pub fn new_symbol(heap: &mut GcHeap, name: &str) -> Value {
    new_text(heap, TypeTag::Symbol, name.as_bytes())
}

/// Length in bytes of a string or symbol.
pub fn string_len(heap: &GcHeap, text: Value) -> usize {
    heap.get(text, 0)
        .as_int()
        .expect("text length is an immediate") as usize
}

/// The bytes of a string or symbol.
pub fn string_bytes<'h>(heap: &'h GcHeap, text: Value) -> &'h [u8] {
    let len = string_len(heap, text);
    let data = heap.get(text, 1);
    &heap.bytes(data)[..len]
}
