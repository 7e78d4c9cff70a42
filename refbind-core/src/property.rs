use std::fmt;

use crate::{
    fail, Argument, Bind, ByValue, Category, Moved, Qualifiers, ReadOnly, TypeDesc, TypeInfo,
    Value, Violation, Volatile,
};

/// How a field is reached, decided by the qualifiers of the owner it's reached through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    #[allow(missing_docs)]
    Mutable,
    #[allow(missing_docs)]
    ReadOnly,
    #[allow(missing_docs)]
    Volatile,
    #[allow(missing_docs)]
    ReadOnlyVolatile,
}

impl Access {
    #[allow(missing_docs)]
    pub fn of(qualifiers: Qualifiers) -> Self {
        match (qualifiers.read_only, qualifiers.volatile) {
            (false, false) => Self::Mutable,
            (true, false) => Self::ReadOnly,
            (false, true) => Self::Volatile,
            (true, true) => Self::ReadOnlyVolatile,
        }
    }
}

trait Accessor: Send + Sync {
    fn owner(&self) -> &'static TypeDesc;

    fn field(&self) -> &'static TypeDesc;

    /// Descriptor of a reference to the field reached with `access` through an owner
    /// of the given category
    fn result_desc(&self, access: Access, lvalue: bool) -> &'static TypeDesc;

    /// # Safety
    ///
    /// `owner` must point to a live object of the owner type, writable unless `access`
    /// is read-only
    unsafe fn field_addr(&self, owner: *mut (), access: Access) -> *mut ();

    /// Overwrites the field at `field` with `source`, converted to the field type
    ///
    /// # Safety
    ///
    /// `field` must point to a live, writable field
    unsafe fn assign(&self, field: *mut (), source: Value<'_>);
}

struct FieldAccessor<C, F> {
    read: fn(&C) -> &F,
    write: fn(&mut C) -> &mut F,
}

impl<C, F> Accessor for FieldAccessor<C, F>
where
    C: TypeInfo + 'static,
    F: ByValue + for<'x> Bind<'x> + 'static,
{
    fn owner(&self) -> &'static TypeDesc {
        C::type_desc()
    }

    fn field(&self) -> &'static TypeDesc {
        F::type_desc()
    }

    fn result_desc(&self, access: Access, lvalue: bool) -> &'static TypeDesc {
        match (access, lvalue) {
            (Access::Mutable, true) => <&mut F>::type_desc(),
            (Access::Mutable, false) => <Moved<F>>::type_desc(),
            (Access::ReadOnly, true) => <&F>::type_desc(),
            (Access::ReadOnly, false) => <Moved<ReadOnly<F>>>::type_desc(),
            (Access::Volatile, true) => <&mut Volatile<F>>::type_desc(),
            (Access::Volatile, false) => <Moved<Volatile<F>>>::type_desc(),
            (Access::ReadOnlyVolatile, true) => <&Volatile<F>>::type_desc(),
            (Access::ReadOnlyVolatile, false) => <Moved<ReadOnly<Volatile<F>>>>::type_desc(),
        }
    }

    unsafe fn field_addr(&self, owner: *mut (), access: Access) -> *mut () {
        match access {
            Access::Mutable | Access::Volatile => {
                let owner = unsafe { &mut *(owner as *mut C) };
                (self.write)(owner) as *mut F as *mut ()
            }
            Access::ReadOnly | Access::ReadOnlyVolatile => {
                let owner = unsafe { &*(owner as *const C) };
                (self.read)(owner) as *const F as *mut ()
            }
        }
    }

    unsafe fn assign(&self, field: *mut (), source: Value<'_>) {
        let value = source.into_typed::<F>();
        unsafe { *(field as *mut F) = value }
    }
}

/// Type-erased accessor of one field of a reflected class
///
/// Reaching a field yields a reference to it that keeps the category of the owner
/// (an rvalue owner gives a [`Moved`] field) and adds the owner's qualifiers to the
/// field's. Extraction then decides what the caller may do with it
#[derive(Default)]
pub struct Property {
    accessor: Option<Box<dyn Accessor>>,
}

pub(crate) static NULL_PROPERTY: Property = Property::null();

impl Property {
    #[allow(missing_docs)]
    pub const fn null() -> Self {
        Self { accessor: None }
    }

    /// Property of `C` reading its field through `read` and writing it through `write`
    ///
    /// ```ignore
    /// Property::new::<Point, f32>(|p| &p.x, |p| &mut p.x)
    /// ```
    pub fn new<C, F>(read: fn(&C) -> &F, write: fn(&mut C) -> &mut F) -> Self
    where
        C: TypeInfo + 'static,
        F: ByValue + for<'x> Bind<'x> + 'static,
    {
        Self {
            accessor: Some(Box::new(FieldAccessor { read, write })),
        }
    }

    #[allow(missing_docs)]
    pub fn is_null(&self) -> bool {
        self.accessor.is_none()
    }

    #[track_caller]
    fn inner(&self) -> &dyn Accessor {
        match &self.accessor {
            Some(accessor) => accessor.as_ref(),
            None => fail(Violation::NullProperty),
        }
    }

    /// Descriptor of the class the field belongs to
    #[track_caller]
    pub fn owner(&self) -> &'static TypeDesc {
        self.inner().owner()
    }

    /// Descriptor of the field type
    #[track_caller]
    pub fn field(&self) -> &'static TypeDesc {
        self.inner().field()
    }

    /// Address of the field of `owner` and descriptor of the reference it's reached as
    #[track_caller]
    fn reach(&self, owner: Argument<'_>) -> (*mut (), &'static TypeDesc) {
        let accessor = self.inner();
        let desc = owner.type_desc();
        if !desc.can_convert_to(accessor.owner()) {
            fail(Violation::Argument {
                index: 0,
                actual: desc.name(),
                param: accessor.owner().name(),
            })
        }

        let access = Access::of(desc.qualifiers());
        let lvalue = desc.category() == Category::LvalueRef;
        // SAFETY: the argument converts to the owner type and is only written through
        // when its qualifiers allow it
        let field = unsafe { accessor.field_addr(owner.addr(), access) };
        (field, accessor.result_desc(access, lvalue))
    }

    /// Reaches the field of `owner`, returning a borrowed value
    #[track_caller]
    pub fn access<'a>(&self, owner: impl Into<Argument<'a>>) -> Value<'a> {
        let (field, desc) = self.reach(owner.into());
        // SAFETY: the field lives as long as the owner borrowed for `'a`
        unsafe { Value::borrowed(field, desc) }
    }

    /// Reads the field of `owner` as `T`
    #[track_caller]
    pub fn get<'a, T: Bind<'a>>(&self, owner: impl Into<Argument<'a>>) -> T {
        self.access(owner).into_typed()
    }

    /// Overwrites the field of `owner` with `value`
    ///
    /// The field must be reachable as a mutable lvalue: owners that are read-only,
    /// volatile or [`Moved`] can't be written through, and neither can read-only
    /// fields. `value` may be anything that converts to the field type by value: an
    /// owned value, qualified or not, is moved in and a referent is copied
    #[track_caller]
    pub fn set<'a, 'v, V: Bind<'v>>(&self, owner: impl Into<Argument<'a>>, value: V) {
        let accessor = self.inner();
        let (field, desc) = self.reach(owner.into());
        let assignable = accessor.result_desc(Access::Mutable, true);
        if desc.qualifiers().read_only || !desc.can_convert_to(assignable) {
            fail(Violation::Extract {
                stored: desc.name(),
                requested: assignable.name(),
            })
        }

        // SAFETY: the field was reached through a mutable lvalue and isn't read-only
        unsafe { accessor.assign(field, value.into_value()) }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(accessor) = &self.accessor else {
            return f.write_str("Property(null)");
        };
        f.debug_struct("Property")
            .field("owner", &accessor.owner().name())
            .field("field", &accessor.field().name())
            .finish()
    }
}
