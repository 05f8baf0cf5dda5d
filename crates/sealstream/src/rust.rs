//! [RustCrypto] and [`blake2b_simd`] backed providers.
//!
//! [RustCrypto]: https://github.com/RustCrypto

use alloc::vec::Vec;
use core::fmt;

use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, KeySizeUser, Payload},
    XChaCha20Poly1305, XNonce,
};
use typenum::Unsigned;
use zeroize::Zeroize;

use crate::{
    csprng::Csprng,
    error::{InvalidHeader, InvalidParameter},
    hash::{Digest, GenericHash},
    keys::RawKey,
    secretstream::{ChunkFlag, Header, OpenError, SealError, SecretStream},
};

/// BLAKE2b with a runtime-chosen digest length and an optional
/// key.
pub struct Blake2b {
    state: blake2b_simd::State,
}

impl GenericHash for Blake2b {
    const MIN_DIGEST_LEN: usize = 1;
    const MAX_DIGEST_LEN: usize = blake2b_simd::OUTBYTES;
    const DIGEST_LEN: usize = blake2b_simd::OUTBYTES / 2;
    const MAX_KEY_LEN: usize = blake2b_simd::KEYBYTES;

    fn init(digest_len: usize, key: Option<&[u8]>) -> Result<Self, InvalidParameter> {
        if !(Self::MIN_DIGEST_LEN..=Self::MAX_DIGEST_LEN).contains(&digest_len) {
            return Err(InvalidParameter::new(
                "digest_len",
                "outside the supported range",
            ));
        }
        let mut params = blake2b_simd::Params::new();
        params.hash_length(digest_len);
        if let Some(key) = key {
            if key.len() > Self::MAX_KEY_LEN {
                return Err(InvalidParameter::new(
                    "key",
                    "longer than the supported maximum",
                ));
            }
            params.key(key);
        }
        Ok(Self {
            state: params.to_state(),
        })
    }

    #[inline]
    fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    #[inline]
    fn finalize(self) -> Digest {
        Digest::from_bytes(self.state.finalize().as_bytes())
    }
}

impl fmt::Debug for Blake2b {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The state may be key-derived.
        f.debug_struct("Blake2b").finish_non_exhaustive()
    }
}

/// The size in bytes of an [`XChaChaStream`] key, as reported by
/// the cipher.
pub const STREAM_KEY_LEN: usize = <<XChaCha20Poly1305 as KeySizeUser>::KeySize as Unsigned>::USIZE;

/// The size in bytes of an [`XChaChaStream`] header, as reported
/// by the cipher.
pub const STREAM_HEADER_LEN: usize =
    <<XChaCha20Poly1305 as AeadCore>::NonceSize as Unsigned>::USIZE;

const TAG_LEN: usize = <<XChaCha20Poly1305 as AeadCore>::TagSize as Unsigned>::USIZE;

/// An [`XChaChaStream`] secret key.
pub type StreamKey = RawKey<STREAM_KEY_LEN>;

/// An [`XChaChaStream`] header.
pub type StreamHeader = Header<STREAM_HEADER_LEN>;

/// A chunked stream sealed with XChaCha20-Poly1305.
///
/// The header doubles as the stream's nonce base: each chunk is
/// sealed under a nonce derived by folding a 64-bit chunk
/// counter into the header's trailing bytes, so two streams
/// under the same key never share a nonce and a chunk only
/// authenticates at its own position. A one-byte [`ChunkFlag`]
/// is sealed ahead of the plaintext inside every frame.
pub struct XChaChaStream {
    cipher: XChaCha20Poly1305,
    header: [u8; STREAM_HEADER_LEN],
    counter: u64,
}

impl XChaChaStream {
    fn new(key: &StreamKey, header: [u8; STREAM_HEADER_LEN]) -> Self {
        let cipher = XChaCha20Poly1305::new(key.as_array().into());
        Self {
            cipher,
            header,
            counter: 0,
        }
    }

    /// Nonce for the chunk at the current counter.
    fn chunk_nonce(&self) -> [u8; STREAM_HEADER_LEN] {
        let mut nonce = self.header;
        let counter = self.counter.to_le_bytes();
        let tail = nonce.len() - counter.len();
        for (n, c) in nonce[tail..].iter_mut().zip(counter) {
            *n ^= c;
        }
        nonce
    }
}

impl SecretStream for XChaChaStream {
    type Key = StreamKey;
    type Header = StreamHeader;

    // One flag byte plus the authentication tag.
    const OVERHEAD: usize = TAG_LEN + 1;
    // Keystream available to a single nonce, less the block
    // reserved for the Poly1305 key.
    const MAX_CHUNK_LEN: u64 = (u32::MAX as u64 - 1) * 64;

    fn init_push<R: Csprng>(key: &Self::Key, rng: &mut R) -> (Self, Self::Header) {
        let mut header = [0u8; STREAM_HEADER_LEN];
        rng.fill_bytes(&mut header);
        (Self::new(key, header), StreamHeader::from(header))
    }

    fn init_pull(key: &Self::Key, header: &Self::Header) -> Result<Self, InvalidHeader> {
        // Every 24-byte value is a valid nonce base; length is
        // already pinned by the type.
        Ok(Self::new(key, *header.as_bytes()))
    }

    fn push(
        &mut self,
        plaintext: &[u8],
        associated_data: &[u8],
        flag: ChunkFlag,
    ) -> Result<Vec<u8>, SealError> {
        if plaintext.len() as u64 > Self::MAX_CHUNK_LEN {
            return Err(SealError::ChunkTooLong);
        }
        let next = self
            .counter
            .checked_add(1)
            .ok_or(SealError::StreamExhausted)?;
        let nonce = self.chunk_nonce();

        let mut frame = Vec::with_capacity(plaintext.len() + 1);
        frame.push(flag.to_byte());
        frame.extend_from_slice(plaintext);
        let sealed = self.cipher.encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: &frame,
                aad: associated_data,
            },
        );
        frame.zeroize();

        let sealed = sealed.map_err(|_| SealError::Encryption)?;
        self.counter = next;
        Ok(sealed)
    }

    fn pull(
        &mut self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<(Vec<u8>, ChunkFlag), OpenError> {
        if ciphertext.len() < Self::OVERHEAD {
            return Err(OpenError::ChunkTooShort);
        }
        let next = self
            .counter
            .checked_add(1)
            .ok_or(OpenError::StreamExhausted)?;
        let nonce = self.chunk_nonce();

        let mut frame = self
            .cipher
            .decrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: ciphertext,
                    aad: associated_data,
                },
            )
            .map_err(|_| OpenError::Authentication)?;

        // ciphertext.len() >= OVERHEAD, so the frame holds at
        // least the flag byte.
        let flag = match ChunkFlag::from_byte(frame.remove(0)) {
            Some(flag) => flag,
            None => {
                frame.zeroize();
                return Err(OpenError::UnknownFlag);
            }
        };
        self.counter = next;
        Ok((frame, flag))
    }
}

impl fmt::Debug for XChaChaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XChaChaStream")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod hash_tests {
        use super::*;
        use crate::test_util::test_generic_hash;

        test_generic_hash!(mod blake2b, Blake2b);

        /// RFC 7693, appendix A: BLAKE2b-512("abc").
        #[test]
        fn test_blake2b_512_abc() {
            use alloc::string::ToString;

            let digest = Blake2b::hash(64, None, b"abc").expect("hash should succeed");
            assert_eq!(
                digest.to_string(),
                "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
                 7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
            );
        }

        /// BLAKE2b-256 of the empty string.
        #[test]
        fn test_blake2b_256_empty() {
            use alloc::string::ToString;

            let digest = Blake2b::hash(32, None, b"").expect("hash should succeed");
            assert_eq!(
                digest.to_string(),
                "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
            );
        }
    }

    mod stream_tests {
        use super::*;
        use crate::test_util::test_secret_stream;

        test_secret_stream!(mod xchacha, XChaChaStream);

        #[test]
        fn test_provider_constants() {
            assert_eq!(STREAM_KEY_LEN, 32);
            assert_eq!(STREAM_HEADER_LEN, 24);
            assert_eq!(XChaChaStream::OVERHEAD, 17);
        }

        #[test]
        fn test_chunk_nonces_are_distinct() {
            let key = StreamKey::from([0u8; STREAM_KEY_LEN]);
            let mut stream = XChaChaStream::new(&key, [0u8; STREAM_HEADER_LEN]);
            let first = stream.chunk_nonce();
            stream
                .push(b"chunk", &[], ChunkFlag::Message)
                .expect("seal should succeed");
            assert_ne!(first, stream.chunk_nonce());
        }

        #[test]
        fn test_flag_rides_inside_frame() {
            let key = StreamKey::from([7u8; STREAM_KEY_LEN]);
            let header = [9u8; STREAM_HEADER_LEN];

            let mut push = XChaChaStream::new(&key, header);
            let sealed = push
                .push(b"last one", &[], ChunkFlag::Final)
                .expect("seal should succeed");
            assert_eq!(sealed.len(), 8 + XChaChaStream::OVERHEAD);

            let mut pull = XChaChaStream::new(&key, header);
            let (plaintext, flag) = pull.pull(&sealed, &[]).expect("open should succeed");
            assert_eq!(plaintext, b"last one");
            assert_eq!(flag, ChunkFlag::Final);
        }

        #[test]
        fn test_short_chunk_is_rejected() {
            let key = StreamKey::from([7u8; STREAM_KEY_LEN]);
            let mut pull = XChaChaStream::new(&key, [0u8; STREAM_HEADER_LEN]);
            assert_eq!(
                pull.pull(&[0u8; XChaChaStream::OVERHEAD - 1], &[]),
                Err(OpenError::ChunkTooShort)
            );
        }
    }
}
