//! # Typed Topics

use std::fmt;
use std::marker::PhantomData;

/// A broadcast topic carrying values of type `T`.
///
/// The name is the only thing that crosses the wire; the type parameter
/// tells publishers and subscribers how to encode and decode payloads.
pub struct Topic<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Topic<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Topic<T> {}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Topic").field(&self.name).finish()
    }
}
