//! Generic function wrappers
//!
//! - [`function_traits`]: the arity-generic [`Callable`](function_traits::Callable) trait
//! - [`memo_cache`]: the thread-safe, never-evicting cache behind every wrapper
//! - [`memoized`]: memoizing wrappers and the `Memoize`/`TryMemoize` capabilities
//! - [`combinators`]: composition, predicate logic and error recovery

pub mod combinators;
pub mod function_traits;
pub mod memo_cache;
pub mod memoized;
pub mod prelude;
