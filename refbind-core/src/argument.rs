use std::fmt;
use std::marker::PhantomData;

use crate::{Moved, TypeDesc, TypeInfo};

/// Non-owning, type-erased view of one call argument
///
/// Built from `&T` (read-only lvalue), `&mut T` (lvalue) or [`Moved<T>`] (rvalue);
/// the descriptor is the one of that reference type
pub struct Argument<'a> {
    addr: *mut (),
    desc: &'static TypeDesc,
    _borrow: PhantomData<&'a mut ()>,
}

impl<'a> Argument<'a> {
    /// Argument pointing at `addr`, described by `desc`
    ///
    /// # Safety
    ///
    /// `addr` must point to an object matching `desc` that stays valid (and writable,
    /// unless `desc` is read-only) for `'a`
    pub unsafe fn new(addr: *mut (), desc: &'static TypeDesc) -> Self {
        Self {
            addr,
            desc,
            _borrow: PhantomData,
        }
    }

    #[allow(missing_docs)]
    pub fn addr(&self) -> *mut () {
        self.addr
    }

    #[allow(missing_docs)]
    pub fn type_desc(&self) -> &'static TypeDesc {
        self.desc
    }
}

impl<'a, T: TypeInfo> From<&'a T> for Argument<'a> {
    fn from(value: &'a T) -> Self {
        // SAFETY: the descriptor is read-only, the shared borrow is held for `'a`
        unsafe { Self::new(value as *const T as *mut (), <&T>::type_desc()) }
    }
}

impl<'a, T: TypeInfo> From<&'a mut T> for Argument<'a> {
    fn from(value: &'a mut T) -> Self {
        // SAFETY: the unique borrow is held for `'a`
        unsafe { Self::new(value as *mut T as *mut (), <&mut T>::type_desc()) }
    }
}

impl<'a, T: TypeInfo> From<Moved<'a, T>> for Argument<'a> {
    fn from(value: Moved<'a, T>) -> Self {
        let desc = <Moved<T>>::type_desc();
        // SAFETY: the unique borrow inside `Moved` is held for `'a`
        unsafe { Self::new(value.into_ptr() as *mut (), desc) }
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("type", &self.desc.name())
            .field("addr", &self.addr)
            .finish()
    }
}

/// Builds an array of [`Argument`]s out of references and [`Moved`] values
///
/// The array is handed over to the call, so one set of arguments binds once:
///
/// ```ignore
/// method.call(args![&mut object, &input, Moved::new(&mut scratch)]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        [] as [$crate::Argument<'_>; 0]
    };
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Argument::from($arg)),+]
    };
}
