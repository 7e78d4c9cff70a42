/// Static typing contract broken by the caller
///
/// None of these are recoverable: every public entry point that detects one reports it
/// through [`fail`], which never returns
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A null method (unregistered name) was invoked or queried
    #[error("null method invoked")]
    NullMethod,

    /// A null property (unregistered name) was accessed
    #[error("null property accessed")]
    NullProperty,

    /// Same member name registered twice for one class
    #[error("`{name}` is already registered on `{class}`")]
    Duplicate {
        #[allow(missing_docs)]
        class: &'static str,
        #[allow(missing_docs)]
        name: String,
    },

    /// Wrong number of arguments for a method
    #[error("method takes {expected} arguments but {found} were passed")]
    Arity {
        #[allow(missing_docs)]
        expected: usize,
        #[allow(missing_docs)]
        found: usize,
    },

    /// Argument doesn't bind to the declared parameter
    #[error("argument {index} of type `{actual}` cannot bind to parameter of type `{param}`")]
    Argument {
        #[allow(missing_docs)]
        index: usize,
        #[allow(missing_docs)]
        actual: &'static str,
        #[allow(missing_docs)]
        param: &'static str,
    },

    /// Requested type doesn't accept the stored value
    #[error("value of type `{stored}` cannot be extracted as `{requested}`")]
    Extract {
        #[allow(missing_docs)]
        stored: &'static str,
        #[allow(missing_docs)]
        requested: &'static str,
    },

    /// Extraction from a value holding nothing
    #[error("cannot extract from a null value")]
    NullValue,

    /// Reference requested out of an owning value that is being consumed
    #[error("cannot borrow `{requested}` out of a consumed owning value")]
    Dangling {
        #[allow(missing_docs)]
        requested: &'static str,
    },

    /// Copy of a value holding a unique reference
    #[error("cannot copy a value holding unique reference `{ty}`")]
    UniqueCopy {
        #[allow(missing_docs)]
        ty: &'static str,
    },

    /// [`crate::TypeInfo::describe`] never recorded an identity
    #[error("descriptor of `{ty}` has no identity")]
    MissingIdentity {
        #[allow(missing_docs)]
        ty: &'static str,
    },
}

/// Aborts the current operation with `violation`
#[cold]
#[track_caller]
pub fn fail(violation: Violation) -> ! {
    tracing::error!(%violation, "contract violation");
    panic!("{violation}")
}

pub(crate) trait OrFail<T> {
    fn or_fail(self) -> T;
}

impl<T> OrFail<T> for Result<T, Violation> {
    #[track_caller]
    fn or_fail(self) -> T {
        match self {
            Ok(value) => value,
            Err(violation) => fail(violation),
        }
    }
}
