//! Incremental hashing with a runtime-chosen digest length.

use alloc::vec::Vec;
use core::fmt;

use subtle::{Choice, ConstantTimeEq};

use crate::error::InvalidParameter;

/// An incremental, optionally keyed hash whose digest length is
/// chosen at initialization.
///
/// Hashing is streaming by nature: input is unbounded while the
/// working state is bounded, so input is absorbed through any
/// number of [`update`][Self::update] calls. The supported
/// digest and key length ranges are reported by the provider
/// through the associated constants rather than assumed, since
/// they may differ between providers.
///
/// Supplying a key turns the hash into a message authentication
/// code: digests computed with and without a key (or with two
/// different keys) over the same input are unrelated.
pub trait GenericHash: Sized {
    /// The smallest supported digest length in bytes.
    const MIN_DIGEST_LEN: usize;
    /// The largest supported digest length in bytes.
    const MAX_DIGEST_LEN: usize;
    /// The recommended digest length in bytes.
    const DIGEST_LEN: usize;
    /// The largest supported key length in bytes.
    const MAX_KEY_LEN: usize;

    /// Begins a hashing session that will produce a
    /// `digest_len`-byte digest, keyed if `key` is provided.
    ///
    /// Rejects `digest_len` outside
    /// [`MIN_DIGEST_LEN`][Self::MIN_DIGEST_LEN]..=[`MAX_DIGEST_LEN`][Self::MAX_DIGEST_LEN]
    /// and keys longer than [`MAX_KEY_LEN`][Self::MAX_KEY_LEN]
    /// before the provider is invoked.
    fn init(digest_len: usize, key: Option<&[u8]>) -> Result<Self, InvalidParameter>;

    /// Absorbs `data` into the session.
    ///
    /// May be called any number of times; the digest depends
    /// only on the concatenation of all absorbed bytes, not on
    /// how they were split across calls.
    fn update(&mut self, data: &[u8]);

    /// Consumes the session and returns the digest.
    fn finalize(self) -> Digest;

    /// Computes the digest of `data` in one call.
    fn hash(digest_len: usize, key: Option<&[u8]>, data: &[u8]) -> Result<Digest, InvalidParameter> {
        let mut ctx = Self::init(digest_len, key)?;
        ctx.update(data);
        Ok(ctx.finalize())
    }
}

/// The output of a [`GenericHash`].
///
/// Its length is exactly the `digest_len` requested at
/// initialization. Digests of keyed hashes are authentication
/// codes and should be compared with
/// [`ConstantTimeEq`][subtle::ConstantTimeEq].
#[derive(Clone, Eq, PartialEq)]
pub struct Digest(Vec<u8>);

impl Digest {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Returns the digest as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length in bytes of the digest.
    // Digests are never empty.
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<[u8]> for Digest {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for Digest {
    #[inline]
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl fmt::Display for Digest {
    /// Writes the digest in lowercase hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_hex_display() {
        let d = Digest::from_bytes(&[0x00, 0xba, 0x80, 0x0f]);
        assert_eq!(format!("{d}"), "00ba800f");
        assert_eq!(format!("{d:?}"), "Digest(00ba800f)");
    }

    #[test]
    fn test_constant_time_eq() {
        let a = Digest::from_bytes(b"0123");
        let b = Digest::from_bytes(b"0123");
        let c = Digest::from_bytes(b"0124");
        assert!(bool::from(a.ct_eq(&b)));
        assert!(!bool::from(a.ct_eq(&c)));
    }
}
