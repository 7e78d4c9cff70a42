use std::ffi::c_void;

use crate::{Category, DescBuilder, Moved, Qualifiers, ReadOnly, TypeDesc, Value, Volatile};

/// Static type that can be described at run-time
///
/// # Safety
///
/// `Static` must be a `'static` stand-in naming exactly this type with lifetimes
/// erased (it keys the descriptor cache), and `describe` must be truthful: a type
/// described with a reference category is represented as a single thin pointer to
/// its referent, and every layer it qualifies away is `#[repr(transparent)]`
pub unsafe trait TypeInfo {
    #[allow(missing_docs)]
    type Static: 'static;

    /// Feeds the layers of this type to `builder`, outermost first
    fn describe(builder: &mut DescBuilder);

    /// Shared descriptor of this type
    fn type_desc() -> &'static TypeDesc {
        crate::desc::type_desc::<Self>()
    }
}

/// Conversion between typed values and type-erased addresses and values
///
/// # Safety
///
/// `from_addr` must only read the object at `addr` the way its descriptor permits:
/// owned types copy it out, reference types alias it
pub unsafe trait Bind<'a>: TypeInfo + Sized {
    /// Produces `Self` from the object living at `addr`
    ///
    /// # Safety
    ///
    /// `addr` must point to a live object whose descriptor converts to `Self`'s, valid
    /// for `'a`
    unsafe fn from_addr(addr: *mut ()) -> Self;

    /// Wraps `self` into a type-erased value
    fn into_value(self) -> Value<'a>;
}

/// Types described with [`Category::Owned`]
///
/// # Safety
///
/// `Self::describe` must never open a reference layer at the top level
pub unsafe trait ByValue: TypeInfo {}

/// Types whose top layer may be written through
///
/// Only these can be reached as `&mut T`, or mutated and consumed through [`Moved<T>`].
/// [`ReadOnly`] never implements it, so a read-only object or member handed out by
/// reflection stays read-only whatever it's extracted as
///
/// # Safety
///
/// `Self::describe` must not mark the top layer read-only
pub unsafe trait Mutable: TypeInfo {}

/// Types that can be extracted out of a shared [`Value`] without gaining unique access
///
/// Owned types are copied out and `&T` only reads. `&mut T` and [`Moved<T>`] are
/// missing on purpose: they need [`Value::get_mut`] or [`Value::into_typed`]
///
/// # Safety
///
/// [`Bind::from_addr`] of such a type must never create a unique reference
pub unsafe trait Shared: TypeInfo {}

/// Parameter and return types of methods, with the borrowed lifetime abstracted away
///
/// A method is registered with its signature instantiated at `'static`; `Of<'x>` is
/// the same type with that lifetime replaced, which is what the callable actually
/// receives on each call. Owned types are their own `Of`
///
/// # Safety
///
/// `Of<'x>` must have the layout and descriptor of `Self`
pub unsafe trait Param: TypeInfo + 'static {
    #[allow(missing_docs)]
    type Of<'x>: Bind<'x>;
}

/// Implements [`TypeInfo`], [`Bind`] and the markers of owned unqualified types for
/// plain `Clone` types
///
/// Such a type is a leaf: it carries no qualifiers and is its own identity
#[macro_export]
macro_rules! impl_type_info {
    ($($ty:ty),+ $(,)?) => {$(
        unsafe impl $crate::TypeInfo for $ty {
            type Static = $ty;

            fn describe(builder: &mut $crate::DescBuilder) {
                builder.identity::<$ty>();
            }
        }

        unsafe impl<'a> $crate::Bind<'a> for $ty {
            unsafe fn from_addr(addr: *mut ()) -> Self {
                ::core::clone::Clone::clone(unsafe { &*(addr as *const $ty) })
            }

            fn into_value(self) -> $crate::Value<'a> {
                $crate::Value::owned(self)
            }
        }

        unsafe impl $crate::ByValue for $ty {}
        unsafe impl $crate::Mutable for $ty {}
        unsafe impl $crate::Shared for $ty {}

        unsafe impl $crate::Param for $ty {
            type Of<'x> = $ty;
        }
    )+};
}

impl_type_info!(u8, u16, u32, u64, u128);
impl_type_info!(i8, i16, i32, i64, i128);
impl_type_info!(usize, isize);
impl_type_info!(f32, f64);
impl_type_info!(bool, char, String);

unsafe impl TypeInfo for () {
    type Static = ();

    fn describe(builder: &mut DescBuilder) {
        builder.identity::<()>();
    }
}

unsafe impl<'a> Bind<'a> for () {
    unsafe fn from_addr(_addr: *mut ()) -> Self {}

    // a call that returns nothing produces nothing
    fn into_value(self) -> Value<'a> {
        Value::null()
    }
}

unsafe impl ByValue for () {}
unsafe impl Mutable for () {}
unsafe impl Shared for () {}

unsafe impl Param for () {
    type Of<'x> = ();
}

// Only ever reached through a pointer, never bound by value
unsafe impl TypeInfo for c_void {
    type Static = c_void;

    fn describe(builder: &mut DescBuilder) {
        builder.identity::<c_void>();
    }
}

unsafe impl<T: TypeInfo> TypeInfo for &T {
    type Static = &'static T::Static;

    fn describe(builder: &mut DescBuilder) {
        builder
            .reference(Category::LvalueRef)
            .qualify(Qualifiers::READ_ONLY);
        T::describe(builder);
    }
}

unsafe impl<'a, T: TypeInfo + 'a> Bind<'a> for &'a T {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        unsafe { &*(addr as *const T) }
    }

    fn into_value(self) -> Value<'a> {
        unsafe { Value::borrowed(self as *const T as *mut (), Self::type_desc()) }
    }
}

unsafe impl<T: TypeInfo> Shared for &T {}

unsafe impl<T: TypeInfo + 'static> Param for &'static T {
    type Of<'x> = &'x T;
}

unsafe impl<T: TypeInfo> TypeInfo for &mut T {
    type Static = &'static mut T::Static;

    fn describe(builder: &mut DescBuilder) {
        builder.reference(Category::LvalueRef);
        T::describe(builder);
    }
}

// `&mut ReadOnly<T>` would allow overwriting the whole read-only object
unsafe impl<'a, T: Mutable + 'a> Bind<'a> for &'a mut T {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        unsafe { &mut *(addr as *mut T) }
    }

    fn into_value(self) -> Value<'a> {
        unsafe { Value::borrowed(self as *mut T as *mut (), Self::type_desc()) }
    }
}

unsafe impl<T: Mutable + 'static> Param for &'static mut T {
    type Of<'x> = &'x mut T;
}

unsafe impl<T: TypeInfo> TypeInfo for Moved<'_, T> {
    type Static = Moved<'static, T::Static>;

    fn describe(builder: &mut DescBuilder) {
        builder.reference(Category::RvalueRef);
        T::describe(builder);
    }
}

unsafe impl<'a, T: TypeInfo + 'a> Bind<'a> for Moved<'a, T> {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        unsafe { Moved::from_ptr(addr as *mut T) }
    }

    fn into_value(self) -> Value<'a> {
        let addr = self.into_ptr() as *mut ();
        unsafe { Value::borrowed(addr, Self::type_desc()) }
    }
}

unsafe impl<T: TypeInfo + 'static> Param for Moved<'static, T> {
    type Of<'x> = Moved<'x, T>;
}

unsafe impl<T: TypeInfo> TypeInfo for *const T {
    type Static = *const T::Static;

    fn describe(builder: &mut DescBuilder) {
        builder.pointer().qualify(Qualifiers::READ_ONLY);
        T::describe(builder);
    }
}

unsafe impl<'a, T: TypeInfo> Bind<'a> for *const T {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        unsafe { *(addr as *const *const T) }
    }

    fn into_value(self) -> Value<'a> {
        Value::owned(self)
    }
}

unsafe impl<T: TypeInfo> ByValue for *const T {}
unsafe impl<T: TypeInfo> Mutable for *const T {}
unsafe impl<T: TypeInfo> Shared for *const T {}

unsafe impl<T: TypeInfo + 'static> Param for *const T {
    type Of<'x> = Self;
}

unsafe impl<T: TypeInfo> TypeInfo for *mut T {
    type Static = *mut T::Static;

    fn describe(builder: &mut DescBuilder) {
        builder.pointer();
        T::describe(builder);
    }
}

unsafe impl<'a, T: TypeInfo> Bind<'a> for *mut T {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        unsafe { *(addr as *const *mut T) }
    }

    fn into_value(self) -> Value<'a> {
        Value::owned(self)
    }
}

unsafe impl<T: TypeInfo> ByValue for *mut T {}
unsafe impl<T: TypeInfo> Mutable for *mut T {}
unsafe impl<T: TypeInfo> Shared for *mut T {}

unsafe impl<T: TypeInfo + 'static> Param for *mut T {
    type Of<'x> = Self;
}

unsafe impl<T: ByValue> TypeInfo for ReadOnly<T> {
    type Static = ReadOnly<T::Static>;

    fn describe(builder: &mut DescBuilder) {
        builder.qualify(Qualifiers::READ_ONLY);
        T::describe(builder);
    }
}

unsafe impl<'a, T: ByValue + Bind<'a> + Clone> Bind<'a> for ReadOnly<T> {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        ReadOnly::new(unsafe { T::from_addr(addr) })
    }

    fn into_value(self) -> Value<'a> {
        Value::owned(self)
    }
}

unsafe impl<T: ByValue> ByValue for ReadOnly<T> {}
unsafe impl<T: ByValue> Shared for ReadOnly<T> {}

unsafe impl<T> Param for ReadOnly<T>
where
    T: ByValue + Clone + for<'x> Bind<'x> + 'static,
{
    type Of<'x> = Self;
}

unsafe impl<T: ByValue> TypeInfo for Volatile<T> {
    type Static = Volatile<T::Static>;

    fn describe(builder: &mut DescBuilder) {
        builder.qualify(Qualifiers::VOLATILE);
        T::describe(builder);
    }
}

unsafe impl<'a, T: ByValue + Copy> Bind<'a> for Volatile<T> {
    unsafe fn from_addr(addr: *mut ()) -> Self {
        Volatile::new(unsafe { std::ptr::read_volatile(addr as *const T) })
    }

    fn into_value(self) -> Value<'a> {
        Value::owned(self)
    }
}

unsafe impl<T: ByValue> ByValue for Volatile<T> {}
unsafe impl<T: ByValue + Mutable> Mutable for Volatile<T> {}
unsafe impl<T: ByValue> Shared for Volatile<T> {}

unsafe impl<T: ByValue + Copy + 'static> Param for Volatile<T> {
    type Of<'x> = Self;
}
