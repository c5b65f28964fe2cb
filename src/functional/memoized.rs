//! Memoizing wrappers
//!
//! [`Memoized`] turns any pure [`Callable`] into one that computes at most once
//! per distinct argument tuple; [`TryMemoized`] does the same for callables
//! returning `Result`, caching only successes.
//!
//! Both are cheap handles: cloning one shares the same cache. Memoizing a
//! wrapper again is a no-op that hands back the very same wrapper, which is
//! what the [`Memoize`] and [`TryMemoize`] capability traits encode.

use std::hash::Hash;
use std::sync::Arc;

use crate::error::{MemoError, MemoResult};
use crate::functional::function_traits::Callable;
use crate::functional::memo_cache::{CacheStats, MemoCache};

/// Configuration for a memoizing wrapper
#[derive(Debug, Clone, Default)]
pub struct MemoConfig {
    /// Name used for the cache in log output
    pub label: Option<String>,
    /// Number of slots to allocate up front
    pub initial_capacity: usize,
}

impl MemoConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    fn build_cache<K, V>(&self) -> MemoCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        let label = self.label.as_deref().unwrap_or("anonymous");
        MemoCache::labelled(self.initial_capacity, label)
    }
}

struct Shared<C, K, V> {
    callable: C,
    cache: MemoCache<K, V>,
}

/// Memoizing wrapper around a pure callable.
///
/// # Examples
///
/// ```
/// use memofn::functional::memoized::Memoize;
///
/// let slow_square = |x: u64| x * x;
/// let fast_square = slow_square.memoized();
/// assert_eq!(fast_square.apply(12), 144);
/// assert_eq!(fast_square.len(), 1);
/// ```
pub struct Memoized<C, Args>
where
    C: Callable<Args>,
{
    shared: Arc<Shared<C, Args, C::Output>>,
}

impl<C, Args> Memoized<C, Args>
where
    C: Callable<Args>,
    Args: Eq + Hash + Clone,
    C::Output: Clone,
{
    pub fn new(callable: C) -> Self {
        Self::with_config(callable, MemoConfig::default())
    }

    pub fn with_config(callable: C, config: MemoConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                callable,
                cache: config.build_cache(),
            }),
        }
    }

    /// Returns `self`: a memoized callable is never wrapped twice
    pub fn memoized(self) -> Self {
        self
    }

    /// Returns the cached value for `args` if it has been computed
    pub fn cached(&self, args: &Args) -> Option<C::Output> {
        self.shared.cache.get(args)
    }

    /// Number of argument tuples computed so far
    pub fn len(&self) -> usize {
        self.shared.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.cache.stats()
    }

    /// Computes every tuple in `keys` on the rayon pool, filling the cache.
    ///
    /// Returns how many of them this call computed; tuples already cached (or
    /// computed concurrently by another caller) are not counted.
    #[cfg(feature = "parallel")]
    pub fn prefetch<I>(&self, keys: I) -> usize
    where
        I: rayon::iter::IntoParallelIterator<Item = Args>,
        C: Send + Sync,
        Args: Send + Sync,
        C::Output: Send + Sync,
    {
        use rayon::iter::ParallelIterator;

        let computed = keys
            .into_par_iter()
            .filter(|args| {
                let mut fresh = false;
                self.shared.cache.get_or_insert_with(args.clone(), |args| {
                    fresh = true;
                    self.shared.callable.call(args)
                });
                fresh
            })
            .count();
        log::debug!(
            "memo[{}]: prefetch computed {} new entries",
            self.shared.cache.label(),
            computed
        );
        computed
    }
}

impl<C, Args> Memoized<C, Args>
where
    C: Callable<Args>,
{
    /// Returns `true` when both handles share the same cache
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.shared, &other.shared)
    }
}

impl<C, Args> Clone for Memoized<C, Args>
where
    C: Callable<Args>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C, Args> Callable<Args> for Memoized<C, Args>
where
    C: Callable<Args>,
    Args: Eq + Hash + Clone,
    C::Output: Clone,
{
    type Output = C::Output;

    fn call(&self, args: Args) -> C::Output {
        let callable = &self.shared.callable;
        self.shared
            .cache
            .get_or_insert_with(args, |args| callable.call(args))
    }
}

impl<C, Args> std::fmt::Debug for Memoized<C, Args>
where
    C: Callable<Args>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("label", &self.shared.cache.label())
            .field("stats", &self.shared.cache.stats())
            .finish()
    }
}

/// Memoizing wrapper around a pure callable that returns `Result<T, E>`.
///
/// Only `Ok` values are cached; an `Err` goes back to the caller untouched
/// and the same arguments are computed again on the next call.
pub struct TryMemoized<C, Args, T> {
    shared: Arc<Shared<C, Args, T>>,
}

impl<C, Args, T, E> TryMemoized<C, Args, T>
where
    C: Callable<Args, Output = Result<T, E>>,
    Args: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new(callable: C) -> Self {
        Self::with_config(callable, MemoConfig::default())
    }

    pub fn with_config(callable: C, config: MemoConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                callable,
                cache: config.build_cache(),
            }),
        }
    }

    /// Returns `self`: a memoized callable is never wrapped twice
    pub fn try_memoized(self) -> Self {
        self
    }

    pub fn cached(&self, args: &Args) -> Option<T> {
        self.shared.cache.get(args)
    }

    pub fn len(&self) -> usize {
        self.shared.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.cache.stats()
    }
}

impl<C, Args, T> TryMemoized<C, Args, T> {
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.shared, &other.shared)
    }
}

impl<C, Args, T> Clone for TryMemoized<C, Args, T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C, Args, T, E> Callable<Args> for TryMemoized<C, Args, T>
where
    C: Callable<Args, Output = Result<T, E>>,
    Args: Eq + Hash + Clone,
    T: Clone,
{
    type Output = Result<T, E>;

    fn call(&self, args: Args) -> Result<T, E> {
        let callable = &self.shared.callable;
        self.shared
            .cache
            .get_or_try_insert_with(args, |args| callable.call(args))
    }
}

impl<C, Args, T> std::fmt::Debug for TryMemoized<C, Args, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TryMemoized")
            .field("label", &self.shared.cache.label())
            .field("stats", &self.shared.cache.stats())
            .finish()
    }
}

macro_rules! impl_apply {
    ($($ty:ident $arg:ident),+) => {
        impl<C, $($ty),+> Memoized<C, ($($ty,)+)>
        where
            C: Callable<($($ty,)+)>,
            ($($ty,)+): Eq + Hash + Clone,
            C::Output: Clone,
        {
            /// Invokes the wrapper with positional arguments
            pub fn apply(&self, $($arg: $ty),+) -> C::Output {
                self.call(($($arg,)+))
            }
        }

        impl<C, $($ty,)+ T, E> TryMemoized<C, ($($ty,)+), T>
        where
            C: Callable<($($ty,)+), Output = Result<T, E>>,
            ($($ty,)+): Eq + Hash + Clone,
            T: Clone,
        {
            /// Invokes the wrapper with positional arguments
            pub fn apply(&self, $($arg: $ty),+) -> Result<T, E> {
                self.call(($($arg,)+))
            }
        }
    };
}

impl_apply!(A a);
impl_apply!(A a, B b);
impl_apply!(A a, B b, C2 c);

/// Capability of turning a callable into a memoized one.
///
/// Plain callables wrap themselves in a fresh [`Memoized`]; a [`Memoized`]
/// returns itself, so memoizing twice never stacks caches.
///
/// The output is cached whatever it is, so a `Result`-returning callable
/// memoized this way keeps its `Err` values too. Use
/// [`TryMemoize::try_memoized`] or [`try_memoize`] to cache only successes.
pub trait Memoize<Args>: Callable<Args> + Sized {
    type Memo: Callable<Args, Output = Self::Output>;

    fn memoized(self) -> Self::Memo;

    fn memoized_with(self, config: MemoConfig) -> Self::Memo;

    fn is_memoized(&self) -> bool {
        false
    }
}

/// Capability of turning a `Result`-returning callable into a [`TryMemoized`]
pub trait TryMemoize<Args, T, E>: Callable<Args, Output = Result<T, E>> + Sized {
    type Memo: Callable<Args, Output = Result<T, E>>;

    fn try_memoized(self) -> Self::Memo;

    fn try_memoized_with(self, config: MemoConfig) -> Self::Memo;

    fn is_memoized(&self) -> bool {
        false
    }
}

impl<C, Args> Memoize<Args> for Memoized<C, Args>
where
    C: Callable<Args>,
    Args: Eq + Hash + Clone,
    C::Output: Clone,
{
    type Memo = Self;

    fn memoized(self) -> Self {
        self
    }

    fn memoized_with(self, config: MemoConfig) -> Self {
        log::debug!(
            "memo[{}]: already memoized, ignoring config for {:?}",
            self.shared.cache.label(),
            config.label
        );
        self
    }

    fn is_memoized(&self) -> bool {
        true
    }
}

impl<C, Args, T, E> TryMemoize<Args, T, E> for TryMemoized<C, Args, T>
where
    C: Callable<Args, Output = Result<T, E>>,
    Args: Eq + Hash + Clone,
    T: Clone,
{
    type Memo = Self;

    fn try_memoized(self) -> Self {
        self
    }

    fn try_memoized_with(self, config: MemoConfig) -> Self {
        log::debug!(
            "memo[{}]: already memoized, ignoring config for {:?}",
            self.shared.cache.label(),
            config.label
        );
        self
    }

    fn is_memoized(&self) -> bool {
        true
    }
}

macro_rules! impl_memoize_for_fn {
    ($($ty:ident),+) => {
        impl<F, $($ty,)+ R> Memoize<($($ty,)+)> for F
        where
            F: Fn($($ty),+) -> R,
            ($($ty,)+): Eq + Hash + Clone,
            R: Clone,
        {
            type Memo = Memoized<F, ($($ty,)+)>;

            fn memoized(self) -> Self::Memo {
                Memoized::new(self)
            }

            fn memoized_with(self, config: MemoConfig) -> Self::Memo {
                Memoized::with_config(self, config)
            }
        }

        impl<F, $($ty,)+ T, E> TryMemoize<($($ty,)+), T, E> for F
        where
            F: Fn($($ty),+) -> Result<T, E>,
            ($($ty,)+): Eq + Hash + Clone,
            T: Clone,
        {
            type Memo = TryMemoized<F, ($($ty,)+), T>;

            fn try_memoized(self) -> Self::Memo {
                TryMemoized::new(self)
            }

            fn try_memoized_with(self, config: MemoConfig) -> Self::Memo {
                TryMemoized::with_config(self, config)
            }
        }
    };
}

impl_memoize_for_fn!(A);
impl_memoize_for_fn!(A, B);
impl_memoize_for_fn!(A, B, C);

/// Memoizes `callable`; already memoized callables come back unchanged.
///
/// # Examples
///
/// ```
/// use memofn::functional::memoized::{memoize, Memoized};
///
/// let doubled = memoize(|x: i32| x * 2);
/// let again = memoize(doubled.clone());
/// assert!(Memoized::ptr_eq(&doubled, &again));
/// ```
pub fn memoize<M, Args>(callable: M) -> M::Memo
where
    M: Memoize<Args>,
{
    callable.memoized()
}

/// Fallible counterpart of [`memoize`]
pub fn try_memoize<M, Args, T, E>(callable: M) -> M::Memo
where
    M: TryMemoize<Args, T, E>,
{
    callable.try_memoized()
}

/// Memoizes a callable that may be absent.
///
/// # Errors
///
/// Returns [`MemoError::InvalidArgument`] when `callable` is `None`.
pub fn memoize_checked<M, Args>(callable: Option<M>) -> MemoResult<M::Memo>
where
    M: Memoize<Args>,
{
    callable
        .map(Memoize::memoized)
        .ok_or_else(|| MemoError::invalid_argument("cannot memoize an absent callable"))
}
