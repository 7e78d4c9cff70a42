//! Rust spellings of qualifiers and of the consumable reference
//!
//! All three are `#[repr(transparent)]`, so an address of `T` is a valid address of
//! `ReadOnly<T>` or `Volatile<T>` and a `Moved<T>` is a single thin pointer

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::Mutable;

/// Value that is never written through once constructed
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadOnly<T>(T);

impl<T> ReadOnly<T> {
    #[allow(missing_docs)]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    #[allow(missing_docs)]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ReadOnly<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnly").field(&self.0).finish()
    }
}

/// Value whose every read and write goes through [`std::ptr::read_volatile`] and
/// [`std::ptr::write_volatile`]
#[repr(transparent)]
pub struct Volatile<T>(T);

impl<T: Copy> Volatile<T> {
    #[allow(missing_docs)]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    #[allow(missing_docs)]
    pub fn read(&self) -> T {
        // SAFETY: `self.0` is a valid, aligned, initialized `T`
        unsafe { std::ptr::read_volatile(&self.0) }
    }

    #[allow(missing_docs)]
    pub fn write(&mut self, value: T) {
        // SAFETY: `self.0` is a valid, aligned `T` and `T: Copy` has nothing to drop
        unsafe { std::ptr::write_volatile(&mut self.0, value) }
    }
}

impl<T: Copy> Clone for Volatile<T> {
    fn clone(&self) -> Self {
        Self(self.read())
    }
}

impl<T: Copy> Copy for Volatile<T> {}

impl<T: Copy + fmt::Debug> fmt::Debug for Volatile<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Volatile").field(&self.read()).finish()
    }
}

/// Reference whose referent may be consumed by whoever receives it
///
/// Only binds where the receiver explicitly accepts a consumable reference or a
/// value; it never binds to `&mut T`. The referent can only be changed or taken when
/// it is [`Mutable`], so a `Moved<ReadOnly<T>>` reads and nothing else:
///
/// ```compile_fail
/// use refbind_core::{Moved, ReadOnly};
///
/// let mut slot = ReadOnly::new(1u32);
/// let moved = Moved::new(&mut slot);
/// let _ = moved.take();
/// ```
#[repr(transparent)]
pub struct Moved<'a, T> {
    referent: NonNull<T>,
    _borrow: PhantomData<&'a mut T>,
}

// SAFETY: same as `&'a mut T`
unsafe impl<T: Send> Send for Moved<'_, T> {}
unsafe impl<T: Sync> Sync for Moved<'_, T> {}

impl<'a, T> Moved<'a, T> {
    #[allow(missing_docs)]
    pub fn new(referent: &'a mut T) -> Self {
        Self {
            referent: NonNull::from(referent),
            _borrow: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `referent` must be valid for `'a` and not otherwise accessed meanwhile. It only
    /// has to be writable if `T` is [`Mutable`]
    pub(crate) unsafe fn from_ptr(referent: *mut T) -> Self {
        Self {
            // SAFETY: callers pass addresses of live objects
            referent: unsafe { NonNull::new_unchecked(referent) },
            _borrow: PhantomData,
        }
    }

    pub(crate) fn into_ptr(self) -> *mut T {
        self.referent.as_ptr()
    }

    /// Gives up the right to change the referent
    pub fn into_read_only(self) -> Moved<'a, ReadOnly<T>> {
        Moved {
            referent: self.referent.cast(),
            _borrow: PhantomData,
        }
    }

    #[allow(missing_docs)]
    pub fn into_ref(self) -> &'a T {
        // SAFETY: the referent is valid and unaliased for `'a`
        unsafe { self.referent.as_ref() }
    }
}

impl<'a, T: Mutable> Moved<'a, T> {
    /// Consumes the referent, leaving `T::default()` behind
    pub fn take(self) -> T
    where
        T: Default,
    {
        std::mem::take(self.into_mut())
    }

    #[allow(missing_docs)]
    pub fn into_mut(self) -> &'a mut T {
        // SAFETY: the referent is valid, unaliased and, being `Mutable`, writable for `'a`
        unsafe { &mut *self.referent.as_ptr() }
    }
}

impl<T> Deref for Moved<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the referent is valid for as long as `self`
        unsafe { self.referent.as_ref() }
    }
}

impl<T: Mutable> DerefMut for Moved<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the referent is valid, unaliased and writable for as long as `self`
        unsafe { self.referent.as_mut() }
    }
}

impl<T: fmt::Debug> fmt::Debug for Moved<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Moved").field(&**self).finish()
    }
}
