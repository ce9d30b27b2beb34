//! Shared, immutable heap storage for large values.

// Arc is the implementation - all usage goes through the newtype
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of Heap<T>"
)]

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reference-counted, immutable storage for heap-backed values.
///
/// Cloning a `Heap` shares the allocation, so copying a `Value` out of the
/// evaluation table is cheap regardless of the size of the list, map or
/// object it holds. Uses `Arc` so values can be handed to overloads running
/// on other threads.
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    /// Move `value` into a new shared allocation.
    #[inline]
    pub fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl Heap<str> {
    /// Move a string into a shared allocation.
    #[inline]
    pub fn from_string(s: String) -> Self {
        Heap(Arc::from(s))
    }
}

impl Heap<[u8]> {
    /// Move a byte buffer into a shared allocation.
    #[inline]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Heap(Arc::from(bytes))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Whether two handles share the same allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: Clone> Heap<T> {
    /// Take the inner value, cloning only if the allocation is shared.
    pub fn into_inner(self) -> T {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}
