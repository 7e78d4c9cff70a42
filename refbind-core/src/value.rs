use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ptr::{self, NonNull};

use crate::error::OrFail;
use crate::{fail, Bind, Shared, TypeDesc, TypeInfo, Violation};

/// Size of the in-place buffer of a [`Value`]
pub const INLINE_CAPACITY: usize = 16;

#[derive(Clone, Copy)]
#[repr(C, align(16))]
struct InlineBuf([MaybeUninit<u8>; INLINE_CAPACITY]);

/// Clone and drop of a boxed payload, captured while its type is still known
#[derive(Clone, Copy)]
struct Payload {
    clone: unsafe fn(NonNull<()>) -> NonNull<()>,
    drop: unsafe fn(NonNull<()>),
}

impl Payload {
    fn of<T: Clone>() -> Self {
        Self {
            clone: clone_boxed::<T>,
            drop: drop_boxed::<T>,
        }
    }
}

unsafe fn clone_boxed<T: Clone>(ptr: NonNull<()>) -> NonNull<()> {
    let copy = unsafe { ptr.cast::<T>().as_ref() }.clone();
    NonNull::from(Box::leak(Box::new(copy))).cast()
}

unsafe fn drop_boxed<T>(ptr: NonNull<()>) {
    drop(unsafe { Box::from_raw(ptr.cast::<T>().as_ptr()) });
}

type CloneInline = unsafe fn(*const (), *mut ());

unsafe fn clone_inline<T: Clone>(src: *const (), dst: *mut ()) {
    unsafe { ptr::write(dst as *mut T, (*(src as *const T)).clone()) }
}

fn fits_inline<T>() -> bool {
    !mem::needs_drop::<T>()
        && mem::size_of::<T>() <= INLINE_CAPACITY
        && mem::align_of::<T>() <= mem::align_of::<InlineBuf>()
}

enum Storage {
    Null,
    Borrowed {
        addr: *mut (),
        desc: &'static TypeDesc,
    },
    Inline {
        buf: UnsafeCell<InlineBuf>,
        clone: CloneInline,
        desc: &'static TypeDesc,
    },
    Boxed {
        ptr: NonNull<()>,
        payload: Payload,
        desc: &'static TypeDesc,
    },
}

/// Type-erased result of a reflected call or property access
///
/// Either holds nothing, aliases an object owned by someone else for `'a`, or owns a
/// value of a type that is only known again when it's extracted. Small payloads
/// without drop glue live in place, everything else is boxed. Either way copies go
/// through the payload's `Clone`
pub struct Value<'a> {
    storage: Storage,
    _borrow: PhantomData<&'a ()>,
}

impl<'a> Value<'a> {
    /// Value holding nothing, produced by calls that return `()`
    pub const fn null() -> Self {
        Self {
            storage: Storage::Null,
            _borrow: PhantomData,
        }
    }

    /// Takes ownership of `value`
    pub fn owned<T: TypeInfo + Clone>(value: T) -> Self {
        let desc = T::type_desc();
        debug_assert!(
            !desc.category().is_reference(),
            "`{desc}` is a reference type"
        );

        let storage = if fits_inline::<T>() {
            let mut buf = InlineBuf([MaybeUninit::uninit(); INLINE_CAPACITY]);
            // SAFETY: `T` fits both the size and the alignment of the buffer
            unsafe { ptr::write(buf.0.as_mut_ptr() as *mut T, value) };
            Storage::Inline {
                buf: UnsafeCell::new(buf),
                clone: clone_inline::<T>,
                desc,
            }
        } else {
            Storage::Boxed {
                ptr: NonNull::from(Box::leak(Box::new(value))).cast(),
                payload: Payload::of::<T>(),
                desc,
            }
        };

        Self {
            storage,
            _borrow: PhantomData,
        }
    }

    /// Aliases the object at `addr` without taking ownership
    ///
    /// # Safety
    ///
    /// `desc` must have a reference category, and `addr` must point to an object of the
    /// referent type that stays valid for `'a`. Unless `desc` is read-only, the object
    /// must be writable through `addr`
    pub unsafe fn borrowed(addr: *mut (), desc: &'static TypeDesc) -> Self {
        Self {
            storage: Storage::Borrowed { addr, desc },
            _borrow: PhantomData,
        }
    }

    #[allow(missing_docs)]
    pub fn is_null(&self) -> bool {
        matches!(self.storage, Storage::Null)
    }

    /// Whether this value aliases an object instead of owning one
    pub fn is_borrowed(&self) -> bool {
        matches!(self.storage, Storage::Borrowed { .. })
    }

    /// Descriptor of the stored value, `None` if null
    pub fn type_desc(&self) -> Option<&'static TypeDesc> {
        match &self.storage {
            Storage::Null => None,
            Storage::Borrowed { desc, .. }
            | Storage::Inline { desc, .. }
            | Storage::Boxed { desc, .. } => Some(*desc),
        }
    }

    /// Moves the contents out, leaving a null value behind
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    fn checked_addr<T: TypeInfo>(&self) -> Result<*mut (), Violation> {
        let (addr, desc) = match &self.storage {
            Storage::Null => return Err(Violation::NullValue),
            Storage::Borrowed { addr, desc } => (*addr, *desc),
            Storage::Inline { buf, desc, .. } => (buf.get() as *mut (), *desc),
            Storage::Boxed { ptr, desc, .. } => (ptr.as_ptr(), *desc),
        };

        let requested = T::type_desc();
        if !desc.can_convert_to(requested) {
            return Err(Violation::Extract {
                stored: desc.name(),
                requested: requested.name(),
            });
        }
        Ok(addr)
    }

    /// Extracts the stored value as `T`
    ///
    /// Owned `T`s are cloned out, `&T` aliases the stored object for as long as `self`
    /// is borrowed. Fails when the value is null or its descriptor doesn't convert to
    /// `T`'s
    ///
    /// Unique references need [`Value::get_mut`]:
    ///
    /// ```compile_fail
    /// use refbind_core::Bind;
    ///
    /// let mut x = 1u32;
    /// let value = (&mut x).into_value();
    /// let first: &mut u32 = value.get();
    /// let second: &mut u32 = value.get();
    /// ```
    #[track_caller]
    pub fn get<'s, T: Bind<'s> + Shared>(&'s self) -> T
    where
        'a: 's,
    {
        let addr = self.checked_addr::<T>().or_fail();
        // SAFETY: the stored object outlives `'s`, its descriptor converts to `T`'s and
        // `T` only reads it
        unsafe { T::from_addr(addr) }
    }

    /// Extracts the stored value as `T`, which may be `&mut U` or [`crate::Moved<U>`]
    ///
    /// Same checks as [`Value::get`]. A unique reference keeps `self` borrowed
    /// mutably, so there is never more than one of them
    #[track_caller]
    pub fn get_mut<'s, T: Bind<'s>>(&'s mut self) -> T
    where
        'a: 's,
    {
        let addr = self.checked_addr::<T>().or_fail();
        // SAFETY: the stored object outlives `'s`, its descriptor converts to `T`'s and
        // `self` is borrowed uniquely for `'s`
        unsafe { T::from_addr(addr) }
    }

    /// Consumes the value, extracting it as `T`
    ///
    /// A borrowed value may become any convertible `T` for the whole of `'a`. An
    /// owning value hands its payload over without a copy and can't become a
    /// reference, since nothing would be left to refer to
    #[track_caller]
    pub fn into_typed<T: Bind<'a>>(mut self) -> T {
        let addr = self.checked_addr::<T>().or_fail();
        let requested = T::type_desc();
        if !self.is_borrowed() && requested.category().is_reference() {
            fail(Violation::Dangling {
                requested: requested.name(),
            })
        }

        match mem::replace(&mut self.storage, Storage::Null) {
            Storage::Null => fail(Violation::NullValue),
            // SAFETY: referent lives for `'a` and converts to `T`
            Storage::Borrowed { .. } => unsafe { T::from_addr(addr) },
            // SAFETY: the buffer holds an initialized object laid out as `T`
            Storage::Inline { buf, .. } => unsafe { ptr::read(buf.get() as *const T) },
            Storage::Boxed { ptr, .. } => {
                let boxed = ptr.cast::<ManuallyDrop<T>>().as_ptr();
                // SAFETY: the allocation holds an object laid out as `T`; it is read out
                // once and then released without running its destructor
                unsafe {
                    let value = ptr::read(boxed as *const T);
                    drop(Box::from_raw(boxed));
                    value
                }
            }
        }
    }
}

impl Default for Value<'_> {
    fn default() -> Self {
        Self::null()
    }
}

/// Copies the held value
///
/// An owning value is deep-copied with the payload's own `Clone`. A borrowed value
/// aliases the same object, which is only allowed for read-only references: copying
/// a `&mut T` or [`crate::Moved<T>`] is a contract violation
impl Clone for Value<'_> {
    #[track_caller]
    fn clone(&self) -> Self {
        let storage = match &self.storage {
            Storage::Null => Storage::Null,
            Storage::Borrowed { addr, desc } => {
                if !desc.qualifiers().read_only {
                    fail(Violation::UniqueCopy { ty: desc.name() })
                }
                Storage::Borrowed {
                    addr: *addr,
                    desc: *desc,
                }
            }
            Storage::Inline { buf, clone, desc } => {
                let copy = UnsafeCell::new(InlineBuf([MaybeUninit::uninit(); INLINE_CAPACITY]));
                // SAFETY: `clone` was captured for the type stored in `buf`, which fits
                // in `copy` as it fit in `buf`
                unsafe { (*clone)(buf.get() as *const (), copy.get() as *mut ()) };
                Storage::Inline {
                    buf: copy,
                    clone: *clone,
                    desc: *desc,
                }
            }
            Storage::Boxed { ptr, payload, desc } => Storage::Boxed {
                // SAFETY: `payload` was captured for the type stored behind `ptr`
                ptr: unsafe { (payload.clone)(*ptr) },
                payload: *payload,
                desc: *desc,
            },
        };

        Self {
            storage,
            _borrow: PhantomData,
        }
    }
}

impl Drop for Value<'_> {
    fn drop(&mut self) {
        if let Storage::Boxed { ptr, payload, .. } = self.storage {
            // SAFETY: `payload` was captured for the type stored behind `ptr`
            unsafe { (payload.drop)(ptr) }
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (storage, desc) = match &self.storage {
            Storage::Null => return f.write_str("Value(null)"),
            Storage::Borrowed { desc, .. } => ("borrowed", desc),
            Storage::Inline { desc, .. } => ("inline", desc),
            Storage::Boxed { desc, .. } => ("boxed", desc),
        };
        f.debug_struct("Value")
            .field("type", &desc.name())
            .field("storage", &storage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{ReadOnly, Volatile};

    static DROPS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Clone, PartialEq, Debug)]
    struct Tracked(u32);

    impl Drop for Tracked {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::SeqCst);
        }
    }

    crate::impl_type_info!(Tracked);

    fn storage_kind(value: &Value<'_>) -> &'static str {
        match value.storage {
            Storage::Null => "null",
            Storage::Borrowed { .. } => "borrowed",
            Storage::Inline { .. } => "inline",
            Storage::Boxed { .. } => "boxed",
        }
    }

    #[test]
    fn small_plain_values_live_inline() {
        assert_eq!(storage_kind(&Value::owned(7u32)), "inline");
        assert_eq!(storage_kind(&Value::owned(7u128)), "inline");
        assert_eq!(storage_kind(&Value::owned(ReadOnly::new(1.5f64))), "inline");
        assert_eq!(storage_kind(&Value::owned(Volatile::new(3u8))), "inline");
    }

    #[test]
    fn values_with_drop_glue_are_boxed() {
        assert_eq!(storage_kind(&Value::owned(String::from("x"))), "boxed");
        assert_eq!(storage_kind(&Value::owned(Tracked(1))), "boxed");
    }

    #[test]
    fn borrowed_values_keep_the_address() {
        let mut x = 5u32;
        let mut value = (&mut x).into_value();
        assert_eq!(storage_kind(&value), "borrowed");
        *value.get_mut::<&mut u32>() = 6;
        assert_eq!(*value.get::<&u32>(), 6);
        drop(value);
        assert_eq!(x, 6);
    }

    #[test]
    fn read_only_borrows_are_copied_as_aliases() {
        let x = 5u32;
        let value = (&x).into_value();
        let copy = value.clone();
        assert_eq!(storage_kind(&copy), "borrowed");
        assert!(std::ptr::eq(copy.get::<&u32>(), &x));
    }

    #[test]
    #[should_panic(expected = "cannot copy a value holding unique reference `&mut u32`")]
    fn unique_borrows_are_not_copied() {
        let mut x = 5u32;
        let value = (&mut x).into_value();
        let _ = value.clone();
    }

    static CLONES: AtomicUsize = AtomicUsize::new(0);

    #[derive(PartialEq, Debug)]
    struct Counted(u32);

    impl Clone for Counted {
        fn clone(&self) -> Self {
            CLONES.fetch_add(1, Ordering::SeqCst);
            Self(self.0 + 1)
        }
    }

    crate::impl_type_info!(Counted);

    #[test]
    fn inline_payload_is_copied_with_its_clone() {
        let value = Value::owned(Counted(1));
        assert_eq!(storage_kind(&value), "inline");

        let before = CLONES.load(Ordering::SeqCst);
        let copy = value.clone();
        assert_eq!(CLONES.load(Ordering::SeqCst) - before, 1);
        assert_eq!(copy.into_typed::<Counted>(), Counted(2));
        assert_eq!(value.into_typed::<Counted>(), Counted(1));
    }

    #[test]
    fn boxed_payload_is_dropped_once_per_copy() {
        let before = DROPS.load(Ordering::SeqCst);
        let value = Value::owned(Tracked(9));
        let copy = value.clone();
        drop(value);
        drop(copy);
        assert_eq!(DROPS.load(Ordering::SeqCst) - before, 2);
    }

    #[test]
    fn into_moves_boxed_payload_out() {
        let value = Value::owned(String::from("payload"));
        let text: String = value.into_typed();
        assert_eq!(text, "payload");
    }

    #[test]
    fn take_leaves_null() {
        let mut value = Value::owned(1u64);
        let moved = value.take();
        assert!(value.is_null());
        assert_eq!(moved.get::<u64>(), 1);
    }
}
