use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Access restrictions carried by a type or by one level of indirection
///
/// `read_only` forbids writing through the handle, `volatile` forbids assuming that
/// two reads observe the same value
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Qualifiers {
    /// Writes are not permitted
    pub read_only: bool,
    /// Reads must not be cached
    pub volatile: bool,
}

impl Qualifiers {
    #[allow(missing_docs)]
    pub const NONE: Self = Self {
        read_only: false,
        volatile: false,
    };
    #[allow(missing_docs)]
    pub const READ_ONLY: Self = Self {
        read_only: true,
        volatile: false,
    };
    #[allow(missing_docs)]
    pub const VOLATILE: Self = Self {
        read_only: false,
        volatile: true,
    };

    /// Whether a handle with these qualifiers may bind to a destination qualified with `dest`
    ///
    /// Destination has to carry at least every restriction of the source
    pub const fn converts_to(self, dest: Self) -> bool {
        !(self.read_only && !dest.read_only) && !(self.volatile && !dest.volatile)
    }

    #[allow(missing_docs)]
    pub const fn is_empty(self) -> bool {
        !self.read_only && !self.volatile
    }
}

impl BitOr for Qualifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            read_only: self.read_only || rhs.read_only,
            volatile: self.volatile || rhs.volatile,
        }
    }
}

impl BitOrAssign for Qualifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.read_only, self.volatile) {
            (false, false) => f.write_str("mutable"),
            (true, false) => f.write_str("read-only"),
            (false, true) => f.write_str("volatile"),
            (true, true) => f.write_str("read-only volatile"),
        }
    }
}

/// How a typed handle relates to the object it denotes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Category {
    /// Self-contained value, no aliasing
    #[default]
    Owned,
    /// Addressable alias, no ownership transfer implied
    LvalueRef,
    /// Addressable alias whose referent may be consumed
    RvalueRef,
}

impl Category {
    /// Whether handles of this category alias some other storage
    pub const fn is_reference(self) -> bool {
        !matches!(self, Self::Owned)
    }

    #[allow(missing_docs)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::LvalueRef => "lvalue reference",
            Self::RvalueRef => "rvalue reference",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
