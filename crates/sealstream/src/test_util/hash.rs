//! [`GenericHash`] tests.

use alloc::{vec, vec::Vec};

use crate::{
    hash::GenericHash,
    test_util::{assert_ct_eq, assert_ct_ne},
};

/// Invokes `callback` for each hash test.
///
/// # Example
///
/// ```
/// use sealstream::rust::Blake2b;
///
/// macro_rules! run_test {
///     ($test:ident) => {
///         sealstream::test_util::hash::$test::<Blake2b>();
///     };
/// }
/// sealstream::for_each_generic_hash_test!(run_test);
/// ```
#[macro_export]
macro_rules! for_each_generic_hash_test {
    ($callback:ident) => {
        $crate::__apply! {
            $callback,
            test_chunking_invariance,
            test_digest_lengths,
            test_rejects_out_of_range,
            test_keyed_separation,
            test_determinism,
        }
    };
}
pub use for_each_generic_hash_test;

/// Performs [`GenericHash`] tests.
///
/// This macro expands into a bunch of individual `#[test]`
/// functions.
///
/// # Example
///
/// ```
/// use sealstream::{test_generic_hash, rust::Blake2b};
///
/// test_generic_hash!(mod blake2b, Blake2b);
/// ```
#[macro_export]
macro_rules! test_generic_hash {
    (mod $name:ident, $hash:ty) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            $crate::test_generic_hash!($hash);
        }
    };
    ($hash:ty) => {
        macro_rules! __generic_hash_test {
            ($test:ident) => {
                #[test]
                fn $test() {
                    $crate::test_util::hash::$test::<$hash>();
                }
            };
        }
        $crate::for_each_generic_hash_test!(__generic_hash_test);
    };
}
pub use test_generic_hash;

const INPUT: &[u8] = b"Call it what you will: the stream never minds how it is \
fed, a byte at a time or a buffer at a time, and a careful reader should \
never be able to tell the difference from the digest alone.";

/// The digest must not depend on how the input was split across
/// `update` calls.
pub fn test_chunking_invariance<H: GenericHash>() {
    let want = H::hash(H::DIGEST_LEN, None, INPUT).expect("single-shot hash should succeed");

    // A byte at a time.
    let mut ctx = H::init(H::DIGEST_LEN, None).expect("init should succeed");
    for b in INPUT {
        ctx.update(&[*b]);
    }
    assert_eq!(want, ctx.finalize());

    // Growing, uneven chunks.
    let mut ctx = H::init(H::DIGEST_LEN, None).expect("init should succeed");
    let mut rest = INPUT;
    let mut width = 1;
    while !rest.is_empty() {
        let (chunk, tail) = rest.split_at(width.min(rest.len()));
        ctx.update(chunk);
        rest = tail;
        width += 3;
    }
    assert_eq!(want, ctx.finalize());

    // Empty updates are no-ops.
    let mut ctx = H::init(H::DIGEST_LEN, None).expect("init should succeed");
    ctx.update(&[]);
    ctx.update(INPUT);
    ctx.update(&[]);
    assert_eq!(want, ctx.finalize());
}

/// Every supported digest length yields exactly that many bytes.
pub fn test_digest_lengths<H: GenericHash>() {
    for digest_len in H::MIN_DIGEST_LEN..=H::MAX_DIGEST_LEN {
        let digest = H::hash(digest_len, None, INPUT).expect("hash should succeed");
        assert_eq!(digest.len(), digest_len, "digest_len = {digest_len}");
    }
}

/// Out-of-range digest and key lengths are rejected before the
/// provider runs.
pub fn test_rejects_out_of_range<H: GenericHash>() {
    if H::MIN_DIGEST_LEN > 0 {
        assert!(H::init(H::MIN_DIGEST_LEN - 1, None).is_err());
    }
    assert!(H::init(H::MAX_DIGEST_LEN + 1, None).is_err());

    let long_key = vec![0u8; H::MAX_KEY_LEN + 1];
    assert!(H::init(H::DIGEST_LEN, Some(&long_key)).is_err());
}

/// Keyed and unkeyed digests over the same input are unrelated,
/// as are digests under different keys.
pub fn test_keyed_separation<H: GenericHash>() {
    let key_a = vec![0x2a; H::MAX_KEY_LEN];
    let key_b = vec![0x2b; H::MAX_KEY_LEN];

    let unkeyed = H::hash(H::DIGEST_LEN, None, INPUT).expect("hash should succeed");
    let keyed_a = H::hash(H::DIGEST_LEN, Some(&key_a), INPUT).expect("hash should succeed");
    let keyed_b = H::hash(H::DIGEST_LEN, Some(&key_b), INPUT).expect("hash should succeed");

    assert_ct_ne!(unkeyed, keyed_a);
    assert_ct_ne!(keyed_a, keyed_b);

    let again = H::hash(H::DIGEST_LEN, Some(&key_a), INPUT).expect("hash should succeed");
    assert_ct_eq!(keyed_a, again);
}

/// Equal inputs hash equal; a one-bit change does not.
pub fn test_determinism<H: GenericHash>() {
    let want = H::hash(H::DIGEST_LEN, None, INPUT).expect("hash should succeed");
    assert_eq!(
        want,
        H::hash(H::DIGEST_LEN, None, INPUT).expect("hash should succeed")
    );

    let mut modified: Vec<u8> = INPUT.to_vec();
    modified[0] ^= 1;
    assert_ne!(
        want,
        H::hash(H::DIGEST_LEN, None, &modified).expect("hash should succeed")
    );
}
