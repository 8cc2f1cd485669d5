//! Loam core value representation.
//!
//! This crate defines the one-word [`Value`] encoding shared by the
//! collector and the host evaluator, plus the host's type-tag space.
//! It has no dependency on the heap: a `Value` is just bits, and only
//! the heap crate can turn a reference value back into an object.
//!
//! # Encoding
//!
//! A `Value` is a single machine word:
//!
//! - `0` is nil.
//! - Low bit set: an immediate signed integer stored in the upper bits
//!   (decoded with an arithmetic shift).
//! - Low bit clear, nonzero: the address of an object payload in the
//!   heap arena. Payloads are word-aligned, so the tag bit is always
//!   free.
//!
//! Integers that do not fit the immediate encoding are boxed into heap
//! `Long` objects by the runtime layer; see [`Value::int`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod tag;
mod value;

pub use tag::TypeTag;
pub use value::Value;

/// Size in bytes of a machine word (and of every payload slot).
pub const WORD_SIZE: usize = core::mem::size_of::<usize>();
