//! Function combinators
//!
//! Composition, predicate logic and error recovery for any [`Callable`],
//! independent of arity. Each combinator is a small struct that is itself a
//! `Callable`, so a composed function can be memoized like any other.

use std::hash::Hash;

use crate::error::MemoError;
use crate::functional::function_traits::{BoxedCallable, Callable};
use crate::functional::memoized::{MemoConfig, Memoize, Memoized, TryMemoize, TryMemoized};

/// `after(first(args))`
#[derive(Debug, Clone)]
pub struct AndThen<F, G> {
    first: F,
    after: G,
}

impl<Args, F, G> Callable<Args> for AndThen<F, G>
where
    F: Callable<Args>,
    G: Callable<(F::Output,)>,
{
    type Output = G::Output;

    fn call(&self, args: Args) -> G::Output {
        self.after.call((self.first.call(args),))
    }
}

/// `outer(before(args))`; takes the arguments of `before`
#[derive(Debug, Clone)]
pub struct Compose<F, B> {
    outer: F,
    before: B,
}

impl<Args, F, B> Callable<Args> for Compose<F, B>
where
    B: Callable<Args>,
    F: Callable<(B::Output,)>,
{
    type Output = F::Output;

    fn call(&self, args: Args) -> F::Output {
        self.outer.call((self.before.call(args),))
    }
}

/// Logical negation of a predicate
#[derive(Debug, Clone)]
pub struct Not<P> {
    predicate: P,
}

impl<Args, P> Callable<Args> for Not<P>
where
    P: Callable<Args, Output = bool>,
{
    type Output = bool;

    fn call(&self, args: Args) -> bool {
        !self.predicate.call(args)
    }
}

/// Short-circuiting conjunction of two predicates
#[derive(Debug, Clone)]
pub struct And<P, Q> {
    left: P,
    right: Q,
}

impl<Args, P, Q> Callable<Args> for And<P, Q>
where
    Args: Clone,
    P: Callable<Args, Output = bool>,
    Q: Callable<Args, Output = bool>,
{
    type Output = bool;

    fn call(&self, args: Args) -> bool {
        self.left.call(args.clone()) && self.right.call(args)
    }
}

/// Short-circuiting disjunction of two predicates
#[derive(Debug, Clone)]
pub struct Or<P, Q> {
    left: P,
    right: Q,
}

impl<Args, P, Q> Callable<Args> for Or<P, Q>
where
    Args: Clone,
    P: Callable<Args, Output = bool>,
    Q: Callable<Args, Output = bool>,
{
    type Output = bool;

    fn call(&self, args: Args) -> bool {
        self.left.call(args.clone()) || self.right.call(args)
    }
}

/// Exclusive or of two predicates; both sides are always evaluated
#[derive(Debug, Clone)]
pub struct Xor<P, Q> {
    left: P,
    right: Q,
}

impl<Args, P, Q> Callable<Args> for Xor<P, Q>
where
    Args: Clone,
    P: Callable<Args, Output = bool>,
    Q: Callable<Args, Output = bool>,
{
    type Output = bool;

    fn call(&self, args: Args) -> bool {
        self.left.call(args.clone()) ^ self.right.call(args)
    }
}

/// Turns a fallible callable into an infallible one by mapping errors to values
#[derive(Debug, Clone)]
pub struct Recover<F, H> {
    fallible: F,
    handler: H,
}

impl<Args, F, H, T, E> Callable<Args> for Recover<F, H>
where
    F: Callable<Args, Output = Result<T, E>>,
    H: Callable<(E,), Output = T>,
{
    type Output = T;

    fn call(&self, args: Args) -> T {
        match self.fallible.call(args) {
            Ok(value) => value,
            Err(err) => self.handler.call((err,)),
        }
    }
}

/// Tries `primary`, then `fallback` with the same arguments if it fails
#[derive(Debug, Clone)]
pub struct FallbackTo<F, G> {
    primary: F,
    fallback: G,
}

impl<Args, F, G, T, E> Callable<Args> for FallbackTo<F, G>
where
    Args: Clone,
    F: Callable<Args, Output = Result<T, E>>,
    G: Callable<Args, Output = Result<T, E>>,
{
    type Output = Result<T, E>;

    fn call(&self, args: Args) -> Result<T, E> {
        match self.primary.call(args.clone()) {
            Ok(value) => Ok(value),
            Err(_) => self.fallback.call(args),
        }
    }
}

/// Nests a callable's error inside [`MemoError::Nested`]
#[derive(Debug, Clone)]
pub struct Nest<F> {
    fallible: F,
}

impl<Args, F, T, E> Callable<Args> for Nest<F>
where
    F: Callable<Args, Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Output = Result<T, MemoError>;

    fn call(&self, args: Args) -> Result<T, MemoError> {
        self.fallible.call(args).map_err(MemoError::nested)
    }
}

/// Combinator methods available on every [`Callable`].
///
/// # Examples
///
/// ```
/// use memofn::functional::combinators::CallableExt;
/// use memofn::functional::function_traits::Callable;
///
/// let is_even = |x: i32| x % 2 == 0;
/// let is_positive = |x: i32| x > 0;
/// let even_and_positive = is_even.and(is_positive);
/// assert!(even_and_positive.call((4,)));
/// assert!(!even_and_positive.call((-4,)));
/// ```
pub trait CallableExt<Args>: Callable<Args> + Sized {
    /// Feeds this callable's output into `after`
    fn and_then<G>(self, after: G) -> AndThen<Self, G>
    where
        G: Callable<(Self::Output,)>,
    {
        AndThen { first: self, after }
    }

    /// Applies `before` first and feeds its output into this callable
    fn compose<B, BArgs>(self, before: B) -> Compose<Self, B>
    where
        B: Callable<BArgs>,
        Self: Callable<(B::Output,)>,
    {
        Compose {
            outer: self,
            before,
        }
    }

    fn negate(self) -> Not<Self>
    where
        Self: Callable<Args, Output = bool>,
    {
        Not { predicate: self }
    }

    fn and<Q>(self, other: Q) -> And<Self, Q>
    where
        Self: Callable<Args, Output = bool>,
        Q: Callable<Args, Output = bool>,
    {
        And {
            left: self,
            right: other,
        }
    }

    fn or<Q>(self, other: Q) -> Or<Self, Q>
    where
        Self: Callable<Args, Output = bool>,
        Q: Callable<Args, Output = bool>,
    {
        Or {
            left: self,
            right: other,
        }
    }

    fn xor<Q>(self, other: Q) -> Xor<Self, Q>
    where
        Self: Callable<Args, Output = bool>,
        Q: Callable<Args, Output = bool>,
    {
        Xor {
            left: self,
            right: other,
        }
    }

    /// Replaces every error with `handler(error)`
    fn recover<H, T, E>(self, handler: H) -> Recover<Self, H>
    where
        Self: Callable<Args, Output = Result<T, E>>,
        H: Callable<(E,), Output = T>,
    {
        Recover {
            fallible: self,
            handler,
        }
    }

    fn fallback_to<G, T, E>(self, fallback: G) -> FallbackTo<Self, G>
    where
        Self: Callable<Args, Output = Result<T, E>>,
        G: Callable<Args, Output = Result<T, E>>,
    {
        FallbackTo {
            primary: self,
            fallback,
        }
    }

    fn nest<T, E>(self) -> Nest<Self>
    where
        Self: Callable<Args, Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Nest { fallible: self }
    }

    fn boxed(self) -> BoxedCallable<Args, Self::Output>
    where
        Self: Send + Sync + 'static,
    {
        BoxedCallable::new(self)
    }
}

impl<Args, C> CallableExt<Args> for C where C: Callable<Args> {}

// Combinators are plain callables: memoizing one wraps it in a fresh cache.
macro_rules! impl_memoize_by_wrapping {
    ($($ty:ident<$($param:ident),+>),+ $(,)?) => {$(
        impl<Args, $($param),+> Memoize<Args> for $ty<$($param),+>
        where
            Self: Callable<Args>,
            Args: Eq + Hash + Clone,
            <Self as Callable<Args>>::Output: Clone,
        {
            type Memo = Memoized<Self, Args>;

            fn memoized(self) -> Self::Memo {
                Memoized::new(self)
            }

            fn memoized_with(self, config: MemoConfig) -> Self::Memo {
                Memoized::with_config(self, config)
            }
        }

        impl<Args, T, E, $($param),+> TryMemoize<Args, T, E> for $ty<$($param),+>
        where
            Self: Callable<Args, Output = Result<T, E>>,
            Args: Eq + Hash + Clone,
            T: Clone,
        {
            type Memo = TryMemoized<Self, Args, T>;

            fn try_memoized(self) -> Self::Memo {
                TryMemoized::new(self)
            }

            fn try_memoized_with(self, config: MemoConfig) -> Self::Memo {
                TryMemoized::with_config(self, config)
            }
        }
    )+};
}

impl_memoize_by_wrapping!(
    AndThen<F, G>,
    Compose<F, B>,
    Not<P>,
    And<P, Q>,
    Or<P, Q>,
    Xor<P, Q>,
    Recover<F, H>,
    FallbackTo<F, G>,
    Nest<F>,
);
