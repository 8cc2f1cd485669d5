//! Loam object layer.
//!
//! Constructors and accessors for the runtime's object types, built
//! entirely on the public heap surface: pairs, boxed integers,
//! strings, symbols, arrays and raw buffers. Every constructor sets
//! the object's type tag and follows the root-stack discipline around
//! each allocation, so callers can rely on arguments staying live even
//! when construction triggers a collection.
//!
//! Evaluator semantics (environments, closures, special forms) live
//! above this crate; it only defines how values are laid out in the
//! heap.

#![warn(clippy::all)]

pub mod types;

pub use types::{
    array_capacity, array_get, array_len, array_push, array_set, head, is_long, long_value,
    new_array, new_data, new_long, new_pair, new_slots, new_string, new_symbol, set_head,
    set_tail, string_bytes, string_len, tail,
};
