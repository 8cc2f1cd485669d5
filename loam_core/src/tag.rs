//! The host type-tag space.
//!
//! Each heap object carries a type tag in its header. The collector
//! stores and reports tags but never interprets them; the meanings
//! below belong to the evaluator's object model.

/// Type tag stored in every object header.
///
/// The numeric values are part of the object model and stable.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeTag {
    /// The type of nil and of anything unrecognized.
    Undefined = 0,
    /// Raw untyped bytes.
    Data = 1,
    /// A boxed integer too wide for the immediate encoding.
    Long = 2,
    /// A boxed floating-point number.
    Double = 3,
    /// A string: length plus a byte buffer.
    String = 4,
    /// An interned name.
    Symbol = 5,
    /// A cons cell.
    Pair = 6,
    /// A buffer of traced value slots (backing store for arrays).
    Slots = 7,
    /// A growable array: length plus a slot buffer.
    Array = 8,
    /// A closure body paired with its environment.
    Expr = 9,
    /// A special form.
    Form = 10,
    /// An applicable wrapper that suppresses argument evaluation.
    Fixed = 11,
    /// A primitive function.
    Subr = 12,
    /// A variable binding.
    Variable = 13,
    /// An environment frame.
    Env = 14,
    /// An evaluation context.
    Context = 15,
}

impl TypeTag {
    /// Decode a raw header word. Unknown tags map to `Undefined`.
    pub fn from_raw(raw: u32) -> TypeTag {
        match raw {
            1 => TypeTag::Data,
            2 => TypeTag::Long,
            3 => TypeTag::Double,
            4 => TypeTag::String,
            5 => TypeTag::Symbol,
            6 => TypeTag::Pair,
            7 => TypeTag::Slots,
            8 => TypeTag::Array,
            9 => TypeTag::Expr,
            10 => TypeTag::Form,
            11 => TypeTag::Fixed,
            12 => TypeTag::Subr,
            13 => TypeTag::Variable,
            14 => TypeTag::Env,
            15 => TypeTag::Context,
            _ => TypeTag::Undefined,
        }
    }

    /// The raw header word for this tag.
    #[inline]
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Whether objects of this type hold no outgoing references.
    ///
    /// Atomic payloads are skipped by the tracer; everything else is
    /// treated as an array of value slots. Strings and symbols are
    /// traced: they hold a reference to their atomic byte buffer.
    #[inline]
    pub fn is_atomic(self) -> bool {
        matches!(self, TypeTag::Data | TypeTag::Long | TypeTag::Double)
    }
}
