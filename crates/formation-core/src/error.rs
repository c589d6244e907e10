use thiserror::Error;

/// Errors raised while building or configuring a formation.
///
/// Frame updates never return these; only initialization and explicit
/// caller requests (selecting, attaching assets) can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormationError {
    #[error("Invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Element index {index} out of range (element count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),
}

pub type Result<T> = std::result::Result<T, FormationError>;
