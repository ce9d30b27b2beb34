//! Thread-safe shared registry wrapper.
//!
//! Provides read-only sharing of the dispatcher and resolvers across every
//! `Interpretable` built by one `Interpreter`.

// Arc is the implementation - all usage goes through the newtype
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedRegistry"
)]

use std::fmt;
use std::sync::Arc;

/// Thread-safe shared registry wrapper (immutable).
///
/// Uses `Arc` internally for thread-safe reference counting.
/// The wrapped registry is immutable after creation, so registration must be
/// finished before the registry is shared.
pub struct SharedRegistry<T: ?Sized>(Arc<T>);

impl<T> SharedRegistry<T> {
    /// Create a new shared registry from an owned registry.
    pub fn new(registry: T) -> Self {
        SharedRegistry(Arc::new(registry))
    }
}

impl<T: ?Sized> From<Box<T>> for SharedRegistry<T> {
    /// Share an already boxed (possibly unsized) registry, such as a trait object.
    fn from(registry: Box<T>) -> Self {
        SharedRegistry(Arc::from(registry))
    }
}

impl<T: ?Sized> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        SharedRegistry(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> std::ops::Deref for SharedRegistry<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRegistry({:?})", &*self.0)
    }
}
