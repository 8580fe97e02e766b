//! Parallel, lock-striped multiplication of sparse multivariate series.
//!
//! The crate's single public operation is [`multiply`]; everything else is
//! the machinery that makes it fast: a statistical size estimator, a
//! cache-blocked kernel, and a separately-chained hash table whose buckets
//! are individually spinlock-guarded so worker threads can accumulate into
//! disjoint buckets without contending on a single global lock.

pub mod config;
pub mod error;
pub mod estimator;
pub mod index;
pub mod kernel;
pub mod multiplier;
pub mod series;
pub mod spinlock;
pub mod term;
pub mod threadpool;
pub mod tracing_sink;

pub use config::MultiplierConfig;
pub use error::{MultiplyError, Result};
pub use multiplier::{multiply, multiply_with_config, tracing_sink};
pub use series::Series;
pub use term::{Coeff, Key, SymbolSet, Term};
