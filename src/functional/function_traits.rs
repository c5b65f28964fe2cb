//! Core callable abstraction
//!
//! Every function shape the crate works with (one, two or three arguments,
//! plain or `Result`-returning) is expressed as a single trait,
//! [`Callable`], parameterized over the argument tuple. Closures and fn
//! items of arity 1 to 3 implement it automatically, so a single generic
//! memoizer or combinator covers all of them.

/// A function invoked with its arguments packed into a tuple.
///
/// `Args` is `(A,)`, `(A, B)` or `(A, B, C)`.
///
/// # Examples
///
/// ```
/// use memofn::functional::function_traits::Callable;
///
/// let add = |a: i32, b: i32| a + b;
/// assert_eq!(add.call((2, 3)), 5);
/// ```
pub trait Callable<Args> {
    type Output;

    fn call(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable_for_fn {
    ($($ty:ident $arg:ident),+) => {
        impl<F, $($ty,)+ R> Callable<($($ty,)+)> for F
        where
            F: Fn($($ty),+) -> R,
        {
            type Output = R;

            #[inline]
            fn call(&self, ($($arg,)+): ($($ty,)+)) -> R {
                self($($arg),+)
            }
        }
    };
}

impl_callable_for_fn!(A a);
impl_callable_for_fn!(A a, B b);
impl_callable_for_fn!(A a, B b, C c);

/// Type-erased callable, produced by `CallableExt::boxed`
pub struct BoxedCallable<Args, R> {
    inner: Box<dyn Callable<Args, Output = R> + Send + Sync>,
}

impl<Args, R> BoxedCallable<Args, R> {
    pub fn new<C>(callable: C) -> Self
    where
        C: Callable<Args, Output = R> + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(callable),
        }
    }
}

impl<Args, R> Callable<Args> for BoxedCallable<Args, R> {
    type Output = R;

    fn call(&self, args: Args) -> R {
        self.inner.call(args)
    }
}

impl<Args, R> std::fmt::Debug for BoxedCallable<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedCallable").finish_non_exhaustive()
    }
}
