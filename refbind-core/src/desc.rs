use std::any::TypeId;
use std::fmt;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::{fail, Category, Qualifiers, TypeInfo, Violation};

/// Marker for "the same underlying type", with qualifiers, references and pointers stripped
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    id: TypeId,
    name: &'static str,
}

impl Identity {
    #[allow(missing_docs)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Whether this is [`std::ffi::c_void`], the pointee of untyped pointers
    pub fn is_untyped(&self) -> bool {
        self.id == TypeId::of::<std::ffi::c_void>()
    }

    /// Name of the underlying type, as reported by [`std::any::type_name`]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

/// Qualifier chain of a pointer type, outermost pointee first
pub type PointerChain = SmallVec<[Qualifiers; 4]>;

/// Binding characteristics of one static type
///
/// Descriptors are immutable and there is exactly one per distinct type, see [`type_desc`]
#[derive(Clone, Debug)]
pub struct TypeDesc {
    name: &'static str,
    category: Category,
    own: Qualifiers,
    referent: Qualifiers,
    effective: Qualifiers,
    pointer_chain: PointerChain,
    identity: Identity,
}

impl TypeDesc {
    /// Rust name of the described type
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[allow(missing_docs)]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Qualifiers of the top-level type
    pub fn own_qualifiers(&self) -> Qualifiers {
        self.own
    }

    /// Qualifiers of the referenced object, empty for owned types
    pub fn referent_qualifiers(&self) -> Qualifiers {
        self.referent
    }

    /// Union of own and referent qualifiers, the ones that actually gate access
    pub fn qualifiers(&self) -> Qualifiers {
        self.effective
    }

    /// Pointee qualifiers, one entry per level of indirection
    pub fn pointer_chain(&self) -> &[Qualifiers] {
        &self.pointer_chain
    }

    #[allow(missing_docs)]
    pub fn identity(&self) -> Identity {
        self.identity
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Own,
    Referent,
    Level(usize),
}

/// Incrementally classifies a type, outermost layer first
///
/// [`TypeInfo::describe`] implementations call it in the order in which the type is
/// spelled: wrappers qualify whatever layer is current, references and pointers open
/// a new layer, and the innermost type records its [`Identity`]
#[derive(Debug)]
pub struct DescBuilder {
    category: Category,
    own: Qualifiers,
    referent: Qualifiers,
    chain: PointerChain,
    slot: Slot,
    identity: Option<Identity>,
}

impl DescBuilder {
    fn new() -> Self {
        Self {
            category: Category::Owned,
            own: Qualifiers::NONE,
            referent: Qualifiers::NONE,
            chain: PointerChain::new(),
            slot: Slot::Own,
            identity: None,
        }
    }

    /// Adds restrictions to the current layer
    pub fn qualify(&mut self, qualifiers: Qualifiers) -> &mut Self {
        match self.slot {
            Slot::Own => self.own |= qualifiers,
            Slot::Referent => self.referent |= qualifiers,
            Slot::Level(level) => self.chain[level] |= qualifiers,
        }
        self
    }

    /// Enters the referent of a reference of the given category
    ///
    /// Only the top-level layer decides the category; a reference met deeper than that
    /// is one more level of indirection. `Category::Owned` leaves the builder untouched
    pub fn reference(&mut self, category: Category) -> &mut Self {
        if !category.is_reference() {
            return self;
        }
        match self.slot {
            Slot::Own => {
                self.category = category;
                self.slot = Slot::Referent;
                self
            }
            _ => self.pointer(),
        }
    }

    /// Enters the pointee of a pointer
    pub fn pointer(&mut self) -> &mut Self {
        self.chain.push(Qualifiers::NONE);
        self.slot = Slot::Level(self.chain.len() - 1);
        self
    }

    /// Records the fully stripped type
    pub fn identity<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.identity = Some(Identity::of::<T>());
        self
    }

    fn finish(self, name: &'static str) -> TypeDesc {
        let Some(identity) = self.identity else {
            fail(Violation::MissingIdentity { ty: name })
        };

        TypeDesc {
            name,
            category: self.category,
            own: self.own,
            referent: self.referent,
            effective: self.own | self.referent,
            pointer_chain: self.chain,
            identity,
        }
    }
}

static DESCRIPTORS: Lazy<DashMap<TypeId, &'static TypeDesc>> = Lazy::new(DashMap::new);

/// Descriptor of `T`, built on first request and shared for the rest of the process
pub fn type_desc<T: TypeInfo + ?Sized>() -> &'static TypeDesc {
    let key = TypeId::of::<T::Static>();
    if let Some(desc) = DESCRIPTORS.get(&key) {
        return *desc;
    }

    *DESCRIPTORS.entry(key).or_insert_with(|| {
        let mut builder = DescBuilder::new();
        T::describe(&mut builder);
        let desc = builder.finish(std::any::type_name::<T>());
        tracing::trace!(
            ty = desc.name,
            category = %desc.category,
            depth = desc.pointer_chain.len(),
            "created type descriptor"
        );
        Box::leak(Box::new(desc))
    })
}
