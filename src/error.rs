use crate::tree::Direction;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of tree and session operations. None of them leave the tree modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("value already exists in the tree")]
    DuplicateValue,
    #[error("value not found in the tree")]
    NotFound,
    #[error("cannot rotate {direction}, the node has no {} child", .direction.opposite())]
    RotationUnavailable { direction: Direction },
    #[error("a {direction} rotation here is not the correct next step towards balance")]
    InvalidRotationRequest { direction: Direction },
    #[error(transparent)]
    ModeViolation(#[from] ModeViolation),
}

/// Requests the current mode does not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ModeViolation {
    #[error("rotate commands are disabled in automatic mode")]
    RotationInAutomaticMode,
    #[error("tree is currently unbalanced, balance it before adding or removing nodes")]
    Unbalanced,
}
