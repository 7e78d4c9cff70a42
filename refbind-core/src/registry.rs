use std::fmt;
use std::marker::PhantomData;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::method::NULL_METHOD;
use crate::property::NULL_PROPERTY;
use crate::{fail, Bind, ByValue, IntoMethod, Method, Property, TypeInfo, Violation};

/// Class whose members can be looked up by name at run-time
///
/// Usually derived, see `#[derive(Reflect)]`. A hand-written implementation fills the
/// registry in [`Reflect::register`] and stores it with [`registry!`](crate::registry):
///
/// ```ignore
/// impl Reflect for Counter {
///     fn register(registry: &mut Registry<Self>) {
///         registry
///             .add_method("bump", Counter::bump)
///             .add_field("count", |c| &c.count, |c| &mut c.count);
///     }
///
///     fn registry() -> &'static Registry<Self> {
///         refbind::registry!(Counter)
///     }
/// }
/// ```
pub trait Reflect: TypeInfo + Sized + 'static {
    /// Registers every member of the class, called once on first use
    fn register(registry: &mut Registry<Self>);

    /// The registry of the class, built on first call and shared afterwards
    fn registry() -> &'static Registry<Self>;
}

/// Name to [`Method`] and name to [`Property`] tables of one class
///
/// Both tables keep registration order. Names are unique within a table; registering
/// one twice is a contract violation
pub struct Registry<C> {
    methods: IndexMap<String, Method>,
    properties: IndexMap<String, Property>,
    _class: PhantomData<fn() -> C>,
}

impl<C: TypeInfo + 'static> Registry<C> {
    /// Empty registry, see [`Registry::build`]
    pub fn new() -> Self {
        Self {
            methods: IndexMap::new(),
            properties: IndexMap::new(),
            _class: PhantomData,
        }
    }

    /// Runs the registration of `C`
    pub fn build() -> Self
    where
        C: Reflect,
    {
        let mut registry = Self::new();
        C::register(&mut registry);
        tracing::debug!(
            class = C::type_desc().name(),
            methods = registry.methods.len(),
            properties = registry.properties.len(),
            "built registry"
        );
        registry
    }

    /// Shared registry of `C`
    pub fn of() -> &'static Self
    where
        C: Reflect,
    {
        C::registry()
    }

    /// Registers a method, see [`IntoMethod`] for what qualifies
    #[track_caller]
    pub fn add_method<Signature>(
        &mut self,
        name: impl Into<String>,
        method: impl IntoMethod<Signature>,
    ) -> &mut Self {
        let name = name.into();
        let method = method.into_method();
        tracing::debug!(
            class = C::type_desc().name(),
            method = %name,
            arity = method.arity(),
            "registered method"
        );

        match self.methods.entry(name) {
            Entry::Occupied(entry) => fail(Violation::Duplicate {
                class: C::type_desc().name(),
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(method);
            }
        }
        self
    }

    #[allow(missing_docs)]
    #[track_caller]
    pub fn add_property(&mut self, name: impl Into<String>, property: Property) -> &mut Self {
        let name = name.into();
        tracing::debug!(
            class = C::type_desc().name(),
            property = %name,
            ty = property.field().name(),
            "registered property"
        );

        match self.properties.entry(name) {
            Entry::Occupied(entry) => fail(Violation::Duplicate {
                class: C::type_desc().name(),
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(property);
            }
        }
        self
    }

    /// Registers a field as a property, shorthand for [`Property::new`]
    #[track_caller]
    pub fn add_field<F: ByValue + for<'x> Bind<'x> + 'static>(
        &mut self,
        name: impl Into<String>,
        read: fn(&C) -> &F,
        write: fn(&mut C) -> &mut F,
    ) -> &mut Self {
        self.add_property(name, Property::new(read, write))
    }

    /// Method registered under `name`, or the null method
    pub fn method(&self, name: &str) -> &Method {
        self.methods.get(name).unwrap_or(&NULL_METHOD)
    }

    /// Property registered under `name`, or the null property
    pub fn property(&self, name: &str) -> &Property {
        self.properties.get(name).unwrap_or(&NULL_PROPERTY)
    }

    /// Method names in registration order
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Property names in registration order
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    #[allow(missing_docs)]
    pub fn methods(&self) -> impl Iterator<Item = (&str, &Method)> {
        self.methods.iter().map(|(name, method)| (name.as_str(), method))
    }

    #[allow(missing_docs)]
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties
            .iter()
            .map(|(name, property)| (name.as_str(), property))
    }
}

impl<C: TypeInfo + 'static> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TypeInfo + 'static> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("class", &C::type_desc().name())
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Shared registry of a (non-generic) [`Reflect`] type, built on first use
///
/// Meant as the body of [`Reflect::registry`]. Registration must not ask for the
/// registry of the type being registered
#[macro_export]
macro_rules! registry {
    ($ty:ty) => {{
        static REGISTRY: $crate::__private::OnceCell<$crate::Registry<$ty>> =
            $crate::__private::OnceCell::new();
        REGISTRY.get_or_init($crate::Registry::<$ty>::build)
    }};
}
