//! Secret key material.

use core::fmt;

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    csprng::{Csprng, Random},
    error::InvalidParameter,
};

/// A fixed-length secret key.
///
/// Keys are zeroized when dropped, compare in constant time, and
/// are redacted from `Debug` output. The key bytes are only ever
/// lent to a provider; nothing in this crate copies them out.
#[derive(Clone)]
pub struct RawKey<const N: usize>([u8; N]);

impl<const N: usize> RawKey<N> {
    /// The size in bytes of the key.
    pub const SIZE: usize = N;

    /// Generates a fresh random key.
    pub fn generate<R: Csprng>(rng: &mut R) -> Self {
        Self(Random::random(rng))
    }

    pub(crate) const fn as_array(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for RawKey<N> {
    #[inline]
    fn from(key: [u8; N]) -> Self {
        Self(key)
    }
}

impl<const N: usize> TryFrom<&[u8]> for RawKey<N> {
    type Error = InvalidParameter;

    fn try_from(key: &[u8]) -> Result<Self, Self::Error> {
        let key = key
            .try_into()
            .map_err(|_| InvalidParameter::new("key", "wrong length"))?;
        Ok(Self(key))
    }
}

impl<const N: usize> Random for RawKey<N> {
    #[inline]
    fn random<R: Csprng>(rng: &mut R) -> Self {
        Self::generate(rng)
    }
}

impl<const N: usize> ConstantTimeEq for RawKey<N> {
    #[inline]
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl<const N: usize> fmt::Debug for RawKey<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawKey").finish_non_exhaustive()
    }
}

impl<const N: usize> ZeroizeOnDrop for RawKey<N> {}
impl<const N: usize> Drop for RawKey<N> {
    #[inline]
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn test_import_checks_length() {
        assert!(RawKey::<32>::try_from(&[0u8; 32][..]).is_ok());
        assert!(RawKey::<32>::try_from(&[0u8; 31][..]).is_err());
        assert!(RawKey::<32>::try_from(&[0u8; 33][..]).is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = RawKey::<32>::from([0xA5; 32]);
        assert_eq!(format!("{key:?}"), "RawKey { .. }");
    }

    #[test]
    fn test_constant_time_eq() {
        let a = RawKey::<16>::from([1; 16]);
        let b = RawKey::<16>::from([1; 16]);
        let c = RawKey::<16>::from([2; 16]);
        assert!(bool::from(a.ct_eq(&b)));
        assert!(!bool::from(a.ct_eq(&c)));
    }
}
