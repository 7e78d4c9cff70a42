//! Run-time binding of reflected methods and fields
//!
//! Every static type gets a [`TypeDesc`] telling how it binds: its category (owned,
//! reference, consumable reference), its qualifiers and those of everything it points
//! to, and the identity of the underlying type. [`TypeDesc::can_convert_to`] decides,
//! the way a compiler would, whether a value can be passed where another type is
//! expected. [`Method`]s and [`Property`]s use it to check type-erased [`Argument`]s
//! before touching them, and [`Value`] uses it to check every extraction.
#![warn(missing_docs)]

mod argument;
mod convert;
mod desc;
mod error;
mod info;
mod method;
mod property;
mod qualifier;
mod registry;
mod value;
mod wrapper;

pub use argument::Argument;
pub use desc::{type_desc, DescBuilder, Identity, PointerChain, TypeDesc};
pub use error::{fail, Violation};
pub use info::{Bind, ByValue, Mutable, Param, Shared, TypeInfo};
pub use method::{IntoMethod, Invoke, Method, MAX_ARITY};
pub use property::{Access, Property};
pub use qualifier::{Category, Qualifiers};
pub use registry::{Reflect, Registry};
pub use value::{Value, INLINE_CAPACITY};
pub use wrapper::{Moved, ReadOnly, Volatile};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
}
