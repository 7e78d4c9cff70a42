use std::fmt;
use std::marker::PhantomData;

use crate::error::OrFail;
use crate::{fail, Argument, Bind, Param, TypeDesc, TypeInfo, Value, Violation};

/// Largest number of parameters, receiver included, a [`Method`] can wrap
pub const MAX_ARITY: usize = 5;

/// Type-erased callable behind a [`Method`]
pub trait Invoke: Send + Sync {
    /// Parameter descriptors, receiver first
    fn params(&self) -> Vec<&'static TypeDesc>;

    #[allow(missing_docs)]
    fn returns(&self) -> &'static TypeDesc;

    /// Checks `args` against the parameters and forwards them to the callable
    ///
    /// Each set of arguments is handed to exactly one invocation, see [`Method::call`]
    fn invoke<'a>(&self, args: &[Argument<'a>]) -> Result<Value<'a>, Violation>;
}

/// Callable that can be wrapped into a [`Method`]
///
/// Implemented for every `Fn` of up to [`MAX_ARITY`] parameters whose parameters and return
/// type implement [`Param`]. Methods are plain functions whose receiver is the first
/// parameter, so `Type::method` works as is, whatever the receiver.
///
/// The callable must accept borrows of any lifetime, and a borrow it returns can only
/// come from its arguments. A function that insists on `'static` references is refused:
///
/// ```compile_fail
/// use refbind_core::Method;
///
/// fn keep(value: &'static u32) -> u32 {
///     *value
/// }
///
/// let _ = Method::new(keep);
/// ```
pub trait IntoMethod<Signature> {
    #[allow(missing_docs)]
    fn into_method(self) -> Method;
}

fn check_arguments(args: &[Argument<'_>], params: &[&'static TypeDesc]) -> Result<(), Violation> {
    if args.len() != params.len() {
        return Err(Violation::Arity {
            expected: params.len(),
            found: args.len(),
        });
    }

    for (index, (arg, param)) in args.iter().zip(params).enumerate() {
        if !arg.type_desc().can_convert_to(param) {
            return Err(Violation::Argument {
                index,
                actual: arg.type_desc().name(),
                param: param.name(),
            });
        }
    }
    Ok(())
}

struct FnAdapter<F, Signature> {
    f: F,
    _signature: PhantomData<fn() -> Signature>,
}

macro_rules! impl_into_method {
    ($($param:ident),*) => {
        impl<Func, Ret, $($param,)*> IntoMethod<(Ret, $($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Ret
                + for<'x> Fn($(<$param as Param>::Of<'x>),*) -> <Ret as Param>::Of<'x>
                + Send
                + Sync
                + 'static,
            Ret: Param,
            $($param: Param,)*
        {
            fn into_method(self) -> Method {
                Method::from_invoke(FnAdapter::<Func, (Ret, $($param,)*)> {
                    f: self,
                    _signature: PhantomData,
                })
            }
        }

        impl<Func, Ret, $($param,)*> Invoke for FnAdapter<Func, (Ret, $($param,)*)>
        where
            Func: for<'x> Fn($(<$param as Param>::Of<'x>),*) -> <Ret as Param>::Of<'x>
                + Send
                + Sync
                + 'static,
            Ret: Param,
            $($param: Param,)*
        {
            fn params(&self) -> Vec<&'static TypeDesc> {
                vec![$(<$param as TypeInfo>::type_desc()),*]
            }

            fn returns(&self) -> &'static TypeDesc {
                Ret::type_desc()
            }

            #[allow(non_snake_case)]
            fn invoke<'a>(&self, args: &[Argument<'a>]) -> Result<Value<'a>, Violation> {
                // pins the callable down to plain `Fn` before calling it
                fn call<'x, Out: Bind<'x>, $($param,)*>(
                    f: impl Fn($($param),*) -> Out,
                    $($param: $param,)*
                ) -> Value<'x> {
                    f($($param),*).into_value()
                }

                let params: &[&'static TypeDesc] = &[$(<$param as TypeInfo>::type_desc()),*];
                check_arguments(args, params)?;
                let [$($param),*] = args else {
                    return Err(Violation::Arity {
                        expected: params.len(),
                        found: args.len(),
                    });
                };

                // SAFETY: every argument converts to its parameter and is borrowed for `'a`
                Ok(call(
                    &self.f,
                    $(unsafe { <<$param as Param>::Of<'a> as Bind<'a>>::from_addr($param.addr()) }),*
                ))
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A0);
impl_into_method!(A0, A1);
impl_into_method!(A0, A1, A2);
impl_into_method!(A0, A1, A2, A3);
impl_into_method!(A0, A1, A2, A3, A4);

/// Type-erased method of a reflected class
///
/// A default-constructed method is null: it stands in for names that were never
/// registered, and any use other than [`Method::is_null`] is a contract violation
#[derive(Default)]
pub struct Method {
    invoke: Option<Box<dyn Invoke>>,
}

pub(crate) static NULL_METHOD: Method = Method::null();

impl Method {
    #[allow(missing_docs)]
    pub const fn null() -> Self {
        Self { invoke: None }
    }

    /// Wraps a callable, see [`IntoMethod`]
    pub fn new<Signature>(f: impl IntoMethod<Signature>) -> Self {
        f.into_method()
    }

    /// Wraps a hand-written [`Invoke`] implementation
    pub fn from_invoke(invoke: impl Invoke + 'static) -> Self {
        Self {
            invoke: Some(Box::new(invoke)),
        }
    }

    #[allow(missing_docs)]
    pub fn is_null(&self) -> bool {
        self.invoke.is_none()
    }

    #[track_caller]
    fn inner(&self) -> &dyn Invoke {
        match &self.invoke {
            Some(invoke) => invoke.as_ref(),
            None => fail(Violation::NullMethod),
        }
    }

    /// Number of parameters, receiver included
    #[track_caller]
    pub fn arity(&self) -> usize {
        self.inner().params().len()
    }

    #[allow(missing_docs)]
    #[track_caller]
    pub fn params(&self) -> Vec<&'static TypeDesc> {
        self.inner().params()
    }

    #[allow(missing_docs)]
    #[track_caller]
    pub fn returns(&self) -> &'static TypeDesc {
        self.inner().returns()
    }

    /// Whether [`Method::call`] would bind `args`, without calling anything
    #[track_caller]
    pub fn accepts(&self, args: &[Argument<'_>]) -> bool {
        check_arguments(args, &self.inner().params()).is_ok()
    }

    /// Invokes the method
    ///
    /// The receiver, if any, is the first argument. Arity mismatches and arguments
    /// that don't bind to their parameter are contract violations, reported before
    /// the callable runs. The arguments are consumed, build them with [`crate::args!`]:
    ///
    /// ```compile_fail
    /// use refbind_core::{args, Method};
    ///
    /// let method = Method::new(|x: &mut u32| -> u32 { *x });
    /// let mut x = 1u32;
    /// let args = args![&mut x];
    /// method.call(args);
    /// method.call(args);
    /// ```
    #[track_caller]
    pub fn call<'a, const N: usize>(&self, args: [Argument<'a>; N]) -> Value<'a> {
        self.inner().invoke(&args).or_fail()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(invoke) = &self.invoke else {
            return f.write_str("Method(null)");
        };
        let params = invoke
            .params()
            .iter()
            .map(|param| param.name())
            .collect::<Vec<_>>();
        f.debug_struct("Method")
            .field("params", &params)
            .field("returns", &invoke.returns().name())
            .finish()
    }
}
