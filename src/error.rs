//! Error types for grid and engine construction.

/// Result type for torus-life operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at construction time or by coordinate-checked mutations.
///
/// The per-tick hot path never returns these: a tick either completes or the
/// process faults.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Width or height of zero
    #[error("invalid grid dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions { width: usize, height: usize },

    /// Explicit worker count of zero
    #[error("invalid worker count: must be at least 1")]
    InvalidWorkerCount,

    /// Cell coordinate outside `[0, width) x [0, height)`
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The rayon worker pool could not be built
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
