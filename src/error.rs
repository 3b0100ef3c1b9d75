use thiserror::Error;

/// Failure categories surfaced by a derivation.
///
/// Functions in this crate return [`anyhow::Result`]; the category travels
/// inside the error and can be recovered with `err.downcast_ref::<NeedlError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NeedlError {
    /// Malformed filename or passkeys, an undersized image, bad option values,
    /// or a strict-edge sample that left the canvas.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The walker hit the iteration cap before the passphrase was complete.
    #[error("derivation timed out after {steps} steps ({completed} passphrase(s) completed)")]
    DerivationTimeout { completed: usize, steps: u32 },

    /// Reserved behaviour that this version does not implement.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

impl NeedlError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns the category carried by `err`, if any.
    pub fn of(err: &anyhow::Error) -> Option<&Self> {
        err.downcast_ref::<Self>()
    }
}
