//! Error types for the `weathervane-world` crate.

/// Errors that can occur during grid and rotation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// A band index beyond the end of the rotation schedule.
    ///
    /// The grid and the schedule must always have equal cardinality, so
    /// this signals a sizing bug rather than a bad request.
    #[error("band index {index} out of range (schedule length {len})")]
    IndexOutOfRange {
        /// The requested band index.
        index: usize,
        /// Length of the rotation schedule.
        len: usize,
    },

    /// A rotation schedule with no entries.
    #[error("rotation schedule must contain at least one weather")]
    EmptyRotation,

    /// Grid parameters that cannot produce a band layout.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// Explanation of what is wrong with the parameters.
        reason: String,
    },
}
