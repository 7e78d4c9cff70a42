/*!
Run-time member binding that follows static reference and qualifier rules

Classes register their methods and fields by name, callers invoke and access them
through type-erased [`Argument`]s and get type-erased [`Value`]s back. Every binding
is checked with the same rules the compiler would apply: a `&mut T` parameter only
accepts mutable lvalues, read-only data never turns writable, a [`Moved`] parameter
never steals from an lvalue. Breaking those rules is a contract violation and
panics, see [`Violation`].

# Type mapping

| bound as            | Rust type               |
|---------------------|-------------------------|
| value               | `T`                     |
| read-only value     | [`ReadOnly<T>`]         |
| volatile value      | [`Volatile<T>`]         |
| lvalue              | `&mut T`                |
| read-only lvalue    | `&T`                    |
| rvalue              | [`Moved<'_, T>`]        |
| pointer             | `*mut T` / `*const T`   |
| untyped pointer     | `*mut c_void`           |

# Examples
```
use refbind::{args, Reflect, Registry};

#[derive(refbind::TypeInfo, refbind::Reflect, Clone, Default)]
#[reflect(methods(bump))]
struct Counter {
    count: i32,
}

impl Counter {
    fn bump(&mut self, by: &i32) -> i32 {
        self.count += by;
        self.count
    }
}

# fn main() {
let mut counter = Counter::default();
let registry = Registry::<Counter>::of();

let total: i32 = registry.method("bump").call(args![&mut counter, &5]).get();
assert_eq!(total, 5);
assert_eq!(registry.property("count").get::<i32>(&counter), 5);
assert!(registry.method("missing").is_null());
# }
```
*/

pub use ::refbind_core::*;
pub use ::refbind_core::{args, impl_type_info, registry};

/// Derive-able implementation of [`TypeInfo`], [`Bind`] and the markers of owned,
/// unqualified types ([`ByValue`], [`Mutable`], [`Shared`] and [`Param`])
///
/// Accepts non-generic structs and enums that are `Clone`. The type is described as
/// an owned, unqualified leaf
pub use refbind_macros::TypeInfo;

/// Derive-able implementation of [`Reflect`]
///
/// Every field becomes a property, in declaration order. Methods have to be listed:
///
/// ```ignore
/// #[derive(TypeInfo, Reflect, Clone)]
/// #[reflect(methods(area, scale))]
/// struct Rect {
///     width: f32,
///     height: f32,
///     #[reflect(skip)]
///     cache: Vec<f32>,
///     #[reflect(rename = "tag")]
///     label: String,
/// }
/// ```
///
/// *Note*: every field type that isn't skipped must implement [`ByValue`]
pub use refbind_macros::Reflect;
