//! Thread-safe memoization for pure functions of one to three arguments.
//!
//! ```
//! use memofn::prelude::*;
//!
//! let area = |w: u32, h: u32| w * h;
//! let area = area.memoized();
//! assert_eq!(area.apply(3, 4), 12);
//! assert_eq!(area.apply(3, 4), 12);
//! assert_eq!(area.stats().misses, 1);
//! ```

pub mod error;
pub mod functional;
pub mod utils;

pub use functional::prelude;
