use thiserror::Error;

/// Largest supported counter modulus (a full 32-bit timer).
pub const MAX_MODULUS: u64 = 1 << 32;

/// Encoder error types covering contract violations, sources, and configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncoderError {
    /// A raw sample outside `[0, modulus)` reached a tracker.
    ///
    /// Points at a misconfigured modulus or a faulty counter source.
    #[error("precondition violation: raw sample {raw} outside [0, {modulus})")]
    PreconditionViolation {
        /// The offending raw counter value.
        raw: u64,
        /// Modulus of the tracker that rejected it.
        modulus: u64,
    },

    /// Counter modulus outside the supported range.
    #[error("invalid modulus {0}: must be within [2, 4294967296]")]
    InvalidModulus(u64),

    /// Counter source failed to produce a reading.
    #[error("counter source error: {0}")]
    Source(String),

    /// Configuration or initialization error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for encoder operations.
pub type EncResult<T> = Result<T, EncoderError>;

/// Check that `modulus` is a usable counter wrap period.
///
/// # Errors
///
/// Returns [`EncoderError::InvalidModulus`] when `modulus` is below 2 or
/// above [`MAX_MODULUS`].
pub fn check_modulus(modulus: u64) -> EncResult<u64> {
    if (2..=MAX_MODULUS).contains(&modulus) {
        Ok(modulus)
    } else {
        Err(EncoderError::InvalidModulus(modulus))
    }
}

/// Check that `raw` lies in `[0, modulus)`.
///
/// # Errors
///
/// Returns [`EncoderError::PreconditionViolation`] otherwise.
pub fn check_raw(raw: u64, modulus: u64) -> EncResult<()> {
    if raw < modulus {
        Ok(())
    } else {
        Err(EncoderError::PreconditionViolation { raw, modulus })
    }
}
