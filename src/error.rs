use thiserror::Error;

/// Errors produced by [`crate::multiply`] and the components it drives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MultiplyError {
    /// The two operands were built from different symbol sets.
    #[error("incompatible symbol sets")]
    IncompatibleSymbolSets,
    /// An integer overflowed while computing a size or bucket count.
    #[error("overflow while computing `{0}`")]
    Overflow(&'static str),
    /// Allocation failed while growing the result table or the spinlock array.
    #[error("out of memory while allocating `{0}`")]
    OutOfMemory(&'static str),
    /// A coefficient accumulation (`+=`) reported an error.
    #[error("coefficient arithmetic error: {0}")]
    CoefficientArithmetic(String),
    /// A worker thread panicked during the parallel phase.
    #[error("worker thread panicked: {0}")]
    WorkerPanic(String),
}

pub type Result<T> = std::result::Result<T, MultiplyError>;
