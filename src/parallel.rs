//! Parallel iteration abstraction.
//!
//! With the `parallel` feature (on by default) these macros hand iteration to
//! rayon. Without it, or on targets where threads are unavailable, they fall
//! back to plain sequential iterators. Callers import
//! `rayon::iter::ParallelIterator` under the same `cfg` so that `map` and
//! `collect` resolve in both builds.
//!
//! ```ignore
//! use crate::iter_maybe_parallel;
//!
//! let rows: Vec<f64> = iter_maybe_parallel!(0..n)
//!     .map(|t| filter_row(t))
//!     .collect();
//! ```

/// Conditionally parallel iteration over ranges and owned collections.
#[macro_export]
macro_rules! iter_maybe_parallel {
    ($expr:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::IntoParallelIterator;

            IntoParallelIterator::into_par_iter($expr)
        }
        #[cfg(not(feature = "parallel"))]
        {
            IntoIterator::into_iter($expr)
        }
    }};
}

/// Conditionally parallel reference iteration over slices.
#[macro_export]
macro_rules! slice_maybe_parallel {
    ($expr:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            $expr.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $expr.iter()
        }
    }};
}

pub use iter_maybe_parallel;
pub use slice_maybe_parallel;
