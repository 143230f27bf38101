/// The only way a calculation can fail.
///
/// Raised before any part of a result is built, so a caller either gets a
/// complete `TaxResult` or this error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TaxError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        TaxError::InvalidInput(msg.into())
    }
}
