//! Explicit LIFO root registration.
//!
//! The collector only knows about values the host has registered as
//! roots. The host pushes a root before any call that can allocate
//! while the value must stay live, and pops it immediately after, in
//! exact reverse order. The stack owns the rooted slots, so a value
//! reassigned through [`RootStack::set`] between push and collection
//! is the one the collector sees.
//!
//! Violating the discipline is a bug in the host, not a runtime
//! condition: both underflow and out-of-order pops abort with a
//! diagnostic.

use loam_core::Value;
use smallvec::SmallVec;

/// A handle naming one registered root slot.
///
/// Handles are indices, cheap to copy, and only meaningful against the
/// stack that issued them while the slot is still pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSlot(u32);

impl RootSlot {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The stack of registered roots.
///
/// Storage is inline up to 32 entries and doubles beyond that.
pub struct RootStack {
    slots: SmallVec<[Value; 32]>,
}

impl RootStack {
    /// Create an empty root stack.
    pub fn new() -> Self {
        RootStack {
            slots: SmallVec::new(),
        }
    }

    /// Register `value` as a root and return its slot.
    pub fn push(&mut self, value: Value) -> RootSlot {
        let slot = RootSlot(self.slots.len() as u32);
        self.slots.push(value);
        slot
    }

    /// Deregister the most recent root, which must be `slot`.
    ///
    /// Returns the value currently held by the slot. Panics with
    /// "root table underflow" when the stack is empty and with
    /// "non-lifo root" when `slot` is not the top of the stack.
    pub fn pop(&mut self, slot: RootSlot) -> Value {
        let top = match self.slots.len().checked_sub(1) {
            Some(top) => top,
            None => panic!("root table underflow"),
        };
        if slot.index() != top {
            panic!("non-lifo root");
        }
        let value = self.slots[top];
        self.slots.truncate(top);
        value
    }

    /// Read the value held by a pushed slot.
    #[inline]
    pub fn get(&self, slot: RootSlot) -> Value {
        self.slots[slot.index()]
    }

    /// Replace the value held by a pushed slot.
    #[inline]
    pub fn set(&mut self, slot: RootSlot, value: Value) {
        self.slots[slot.index()] = value;
    }

    /// Number of registered roots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no roots are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate the rooted values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.slots.iter().copied()
    }
}

impl Default for RootStack {
    fn default() -> Self {
        Self::new()
    }
}
