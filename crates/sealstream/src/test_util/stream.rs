//! [`SecretStream`] tests.
//!
//! The tests drive providers through [`StreamSession`], since
//! that is the surface callers use.

use crate::{
    csprng::{Csprng, Random},
    error::Error,
    secretstream::{SecretStream, StreamSession},
};

/// Invokes `callback` for each secret-stream test.
///
/// # Example
///
/// ```
/// use sealstream::{default::Rng, rust::XChaChaStream};
///
/// macro_rules! run_test {
///     ($test:ident) => {
///         sealstream::test_util::stream::$test::<XChaChaStream, _>(&mut Rng);
///     };
/// }
/// sealstream::for_each_secret_stream_test!(run_test);
/// ```
#[macro_export]
macro_rules! for_each_secret_stream_test {
    ($callback:ident) => {
        $crate::__apply! {
            $callback,
            test_round_trip,
            test_overhead,
            test_single_bit_tamper,
            test_reordered_chunks,
            test_header_mismatch,
            test_wrong_key,
            test_wrong_associated_data,
            test_truncated_stream,
        }
    };
}
pub use for_each_secret_stream_test;

/// Performs [`SecretStream`] tests.
///
/// This macro expands into a bunch of individual `#[test]`
/// functions.
///
/// # Example
///
/// ```
/// use sealstream::{test_secret_stream, rust::XChaChaStream};
///
/// test_secret_stream!(mod xchacha, XChaChaStream);
/// ```
#[macro_export]
macro_rules! test_secret_stream {
    (mod $name:ident, $stream:ty) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            $crate::test_secret_stream!($stream);
        }
    };
    ($stream:ty) => {
        macro_rules! __secret_stream_test {
            ($test:ident) => {
                #[test]
                fn $test() {
                    use $crate::{default::Rng, test_util::stream::$test};

                    $test::<$stream, _>(&mut Rng);
                }
            };
        }
        $crate::for_each_secret_stream_test!(__secret_stream_test);
    };
}
pub use test_secret_stream;

fn fresh_key<S: SecretStream, R: Csprng>(rng: &mut R) -> S::Key {
    <S::Key as Random>::random(rng)
}

/// Pulling what was pushed returns the plaintext, the sender's
/// final flag, and nothing else.
pub fn test_round_trip<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, header) = StreamSession::<S>::init_encrypt(&key, rng);

    let chunks: &[(&[u8], Option<&[u8]>, bool)] = &[
        (b"first chunk", None, false),
        (b"", None, false),
        (b"second chunk", Some(b"record 2"), false),
        (b"tail", None, true),
    ];

    let mut sealed = alloc::vec::Vec::new();
    for (plaintext, ad, is_final) in chunks {
        sealed.push(
            tx.push_chunk(plaintext, *ad, *is_final)
                .expect("push_chunk should succeed"),
        );
    }
    assert!(tx.is_finalized());

    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    for ((plaintext, ad, is_final), chunk) in chunks.iter().zip(&sealed) {
        let (got, fin) = rx.pull_chunk(chunk, *ad).expect("pull_chunk should succeed");
        assert_eq!(got.as_slice(), *plaintext);
        assert_eq!(fin, *is_final);
    }
    assert!(rx.is_finalized());
}

/// Every sealed chunk is exactly `OVERHEAD` bytes longer than
/// its plaintext.
pub fn test_overhead<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, _header) = StreamSession::<S>::init_encrypt(&key, rng);

    for plaintext in [&b""[..], b"x", b"some longer chunk of plaintext"] {
        let sealed = tx
            .push_chunk(plaintext, None, false)
            .expect("push_chunk should succeed");
        assert_eq!(sealed.len(), plaintext.len() + S::OVERHEAD);
    }
}

/// Flipping any single bit of a sealed chunk makes it fail
/// authentication.
pub fn test_single_bit_tamper<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, header) = StreamSession::<S>::init_encrypt(&key, rng);
    let sealed = tx
        .push_chunk(b"covert", None, true)
        .expect("push_chunk should succeed");

    for i in 0..sealed.len() {
        for bit in 0..8 {
            let mut tampered = sealed.clone();
            tampered[i] ^= 1u8 << bit;

            let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
            assert!(
                matches!(
                    rx.pull_chunk(&tampered, None),
                    Err(Error::AuthenticationFailed(_))
                ),
                "byte {i}, bit {bit}"
            );
        }
    }

    // The untampered chunk still opens.
    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    assert!(rx.pull_chunk(&sealed, None).is_ok());
}

/// Chunks only authenticate at the position they were produced:
/// neither swapping nor replaying goes unnoticed.
pub fn test_reordered_chunks<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, header) = StreamSession::<S>::init_encrypt(&key, rng);
    let c1 = tx.push_chunk(b"one", None, false).expect("push_chunk");
    let c2 = tx.push_chunk(b"two", None, false).expect("push_chunk");

    // Swapped.
    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    assert!(matches!(
        rx.pull_chunk(&c2, None),
        Err(Error::AuthenticationFailed(_))
    ));

    // Replayed.
    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    assert!(rx.pull_chunk(&c1, None).is_ok());
    assert!(matches!(
        rx.pull_chunk(&c1, None),
        Err(Error::AuthenticationFailed(_))
    ));
}

/// A decrypt session built from the wrong header fails on the
/// very first chunk.
pub fn test_header_mismatch<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, _header) = StreamSession::<S>::init_encrypt(&key, rng);
    let (_other_tx, other_header) = StreamSession::<S>::init_encrypt(&key, rng);
    let sealed = tx.push_chunk(b"chunk", None, false).expect("push_chunk");

    let mut rx = StreamSession::<S>::init_decrypt(&key, &other_header).expect("init_decrypt");
    assert!(matches!(
        rx.pull_chunk(&sealed, None),
        Err(Error::AuthenticationFailed(_))
    ));
}

/// A decrypt session built from the wrong key fails on the very
/// first chunk.
pub fn test_wrong_key<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let other_key = fresh_key::<S, _>(rng);
    let (mut tx, header) = StreamSession::<S>::init_encrypt(&key, rng);
    let sealed = tx.push_chunk(b"chunk", None, false).expect("push_chunk");

    let mut rx = StreamSession::<S>::init_decrypt(&other_key, &header).expect("init_decrypt");
    assert!(matches!(
        rx.pull_chunk(&sealed, None),
        Err(Error::AuthenticationFailed(_))
    ));
}

/// Associated data must match exactly, including its absence.
pub fn test_wrong_associated_data<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, header) = StreamSession::<S>::init_encrypt(&key, rng);
    let sealed = tx
        .push_chunk(b"chunk", Some(b"route A"), false)
        .expect("push_chunk");

    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    assert!(matches!(
        rx.pull_chunk(&sealed, Some(b"route B")),
        Err(Error::AuthenticationFailed(_))
    ));

    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    assert!(matches!(
        rx.pull_chunk(&sealed, None),
        Err(Error::AuthenticationFailed(_))
    ));
}

/// A stream cut off before its final chunk leaves the decrypt
/// session unfinalized, which is how callers detect truncation.
pub fn test_truncated_stream<S: SecretStream, R: Csprng>(rng: &mut R) {
    let key = fresh_key::<S, _>(rng);
    let (mut tx, header) = StreamSession::<S>::init_encrypt(&key, rng);
    let c1 = tx.push_chunk(b"kept", None, false).expect("push_chunk");
    let _c2 = tx.push_chunk(b"lost", None, true).expect("push_chunk");

    let mut rx = StreamSession::<S>::init_decrypt(&key, &header).expect("init_decrypt");
    let (_, fin) = rx.pull_chunk(&c1, None).expect("pull_chunk");
    assert!(!fin);
    assert!(!rx.is_finalized());
}
