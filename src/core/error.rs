use thiserror::Error;

/// Misuse of the projection inputs.
///
/// The growth arithmetic itself never fails; these are raised when a caller
/// hands over a schedule that breaks the dense, zero-based, ascending
/// year-index contract, or edits a row that does not exist.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("schedule is missing year {expected} (found year {found} in its place)")]
    MissingYear { expected: u32, found: u32 },

    #[error("year {year} appears more than once in the schedule")]
    DuplicateYear { year: u32 },

    #[error("year {found} follows year {previous}; schedule must be ascending")]
    YearOutOfOrder { previous: u32, found: u32 },

    #[error("year {year} is not part of the schedule")]
    UnknownYear { year: u32 },

    #[error("no yield period with order {order}")]
    UnknownOrder { order: u32 },
}
