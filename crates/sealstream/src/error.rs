//! Error handling.

/// An error from this crate.
///
/// Each variant wraps one of the fine-grained error kinds so that
/// callers can match on the kind that matters to them. In
/// particular, [`AuthenticationFailed`] signals tampering or
/// corruption and warrants a "discard the stream" policy, while
/// the other kinds point at the call site.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// See [`InvalidParameter`].
    #[error("{0}")]
    InvalidParameter(#[from] InvalidParameter),

    /// See [`InvalidState`].
    #[error("{0}")]
    InvalidState(#[from] InvalidState),

    /// See [`InvalidHeader`].
    #[error("{0}")]
    InvalidHeader(#[from] InvalidHeader),

    /// See [`AuthenticationFailed`].
    #[error("{0}")]
    AuthenticationFailed(#[from] AuthenticationFailed),
}

/// A caller-supplied size or length is outside the range the
/// provider supports.
///
/// This is always raised before the provider is invoked.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid parameter: `{arg}`: {reason}")]
pub struct InvalidParameter {
    arg: &'static str,
    reason: &'static str,
}

impl InvalidParameter {
    /// Creates an `InvalidParameter` for `arg`.
    #[inline]
    pub const fn new(arg: &'static str, reason: &'static str) -> Self {
        Self { arg, reason }
    }
}

/// An operation was invoked in a session state that forbids it.
///
/// This is a programming error at the call site, not a property
/// of the data being processed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid state: `{op}`: {reason}")]
pub struct InvalidState {
    op: &'static str,
    reason: &'static str,
}

impl InvalidState {
    #[inline]
    pub(crate) const fn new(op: &'static str, reason: &'static str) -> Self {
        Self { op, reason }
    }
}

/// The stream header was rejected as malformed.
///
/// Only the decrypt side can observe this. Note that a
/// well-formed header is not necessarily authentic: authenticity
/// is established by the first successfully opened chunk.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid stream header")]
pub struct InvalidHeader;

/// Chunk authentication failed.
///
/// The chunk was tampered with, corrupted, reordered, truncated,
/// or sealed under a different key, header, or associated data.
/// No plaintext is released. The failure is not transient: the
/// whole stream must be discarded.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("chunk authentication failed")]
pub struct AuthenticationFailed;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinguishable() {
        let auth = Error::from(AuthenticationFailed);
        let state = Error::from(InvalidState::new("push_chunk", "stream already finalized"));
        let param = Error::from(InvalidParameter::new("digest_len", "out of range"));
        let header = Error::from(InvalidHeader);

        assert!(matches!(auth, Error::AuthenticationFailed(_)));
        assert!(matches!(state, Error::InvalidState(_)));
        assert!(matches!(param, Error::InvalidParameter(_)));
        assert!(matches!(header, Error::InvalidHeader(_)));
        assert_ne!(auth, header);
    }

    #[test]
    fn test_display() {
        use alloc::string::ToString;

        let err = Error::from(InvalidParameter::new("key", "too long"));
        assert_eq!(err.to_string(), "invalid parameter: `key`: too long");
        assert_eq!(
            Error::from(AuthenticationFailed).to_string(),
            "chunk authentication failed"
        );
    }
}
