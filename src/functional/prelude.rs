//! Prelude for the function wrappers
//!
//! Re-exports the traits needed to call, combine and memoize callables, so a
//! single glob import brings every method into scope.

pub use crate::error::{MemoError, MemoResult};
pub use crate::functional::combinators::CallableExt;
pub use crate::functional::function_traits::{BoxedCallable, Callable};
pub use crate::functional::memo_cache::{CacheStats, MemoCache};
pub use crate::functional::memoized::{
    memoize, memoize_checked, try_memoize, MemoConfig, Memoize, Memoized, TryMemoize,
    TryMemoized,
};
