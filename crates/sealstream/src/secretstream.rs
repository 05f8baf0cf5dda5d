//! Chunked authenticated encryption over an ordered byte stream.
//!
//! A stream is an ordered sequence of chunks, each sealed with an
//! authentication tag. The encrypt side produces a per-stream
//! [`Header`] that must reach the decrypt side ahead of the first
//! chunk; the header is public but unpredictable. The last chunk
//! of a stream carries a final marker bound into its tag, so a
//! receiver can tell a completed stream from a truncated one.
//!
//! Chunks must be processed in the exact order they were
//! produced. Reordered, replayed, or cross-stream chunks fail
//! authentication, as does any modification to a chunk, its tag,
//! or its associated data. An authentication failure is never
//! transient: the whole stream must be discarded.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    csprng::{Csprng, Random},
    error::{AuthenticationFailed, Error, InvalidHeader, InvalidParameter, InvalidState},
};

/// Marks a chunk as ordinary or as the stream's last.
///
/// The flag travels inside the sealed frame, covered by the
/// chunk's authentication tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkFlag {
    /// An ordinary chunk with more to follow.
    Message,
    /// The stream's last chunk.
    Final,
}

impl ChunkFlag {
    pub(crate) const fn to_byte(self) -> u8 {
        match self {
            Self::Message => 0,
            Self::Final => 1,
        }
    }

    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Message),
            1 => Some(Self::Final),
            _ => None,
        }
    }
}

/// A per-stream public value that initializes the cipher state.
///
/// Generated fresh by the encrypt side and consumed by the
/// decrypt side. It is not secret, but the decrypt side cannot
/// tell an authentic header from a forged one until the first
/// chunk is successfully opened.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Header<const N: usize>([u8; N]);

impl<const N: usize> Header<N> {
    /// The size in bytes of the header.
    pub const SIZE: usize = N;

    /// Returns the header as a byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for Header<N> {
    #[inline]
    fn from(header: [u8; N]) -> Self {
        Self(header)
    }
}

impl<const N: usize> TryFrom<&[u8]> for Header<N> {
    type Error = InvalidParameter;

    fn try_from(header: &[u8]) -> Result<Self, Self::Error> {
        let header = header
            .try_into()
            .map_err(|_| InvalidParameter::new("header", "wrong length"))?;
        Ok(Self(header))
    }
}

impl<const N: usize> AsRef<[u8]> for Header<N> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> fmt::Debug for Header<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Header(")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// An error from [`SecretStream::push`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SealError {
    /// The plaintext is longer than the provider's chunk limit.
    #[error("chunk is longer than the provider's limit")]
    ChunkTooLong,
    /// The stream's chunk counter is exhausted.
    #[error("the stream's chunk counter is exhausted")]
    StreamExhausted,
    /// The provider refused to seal the chunk.
    #[error("unable to seal the chunk")]
    Encryption,
}

impl From<SealError> for Error {
    fn from(err: SealError) -> Self {
        match err {
            SealError::ChunkTooLong => {
                InvalidParameter::new("plaintext", "longer than the provider's chunk limit").into()
            }
            SealError::StreamExhausted => {
                InvalidState::new("push_chunk", "chunk counter exhausted").into()
            }
            SealError::Encryption => {
                InvalidParameter::new("plaintext", "rejected by the provider").into()
            }
        }
    }
}

/// An error from [`SecretStream::pull`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OpenError {
    /// The ciphertext is shorter than the sealing overhead.
    #[error("chunk is shorter than the sealing overhead")]
    ChunkTooShort,
    /// The stream's chunk counter is exhausted.
    #[error("the stream's chunk counter is exhausted")]
    StreamExhausted,
    /// The chunk could not be authenticated.
    #[error("chunk authentication failed")]
    Authentication,
    /// The chunk authenticated but carries a flag this
    /// implementation does not know.
    #[error("chunk carries an unknown flag")]
    UnknownFlag,
}

impl From<OpenError> for Error {
    fn from(err: OpenError) -> Self {
        match err {
            OpenError::StreamExhausted => {
                InvalidState::new("pull_chunk", "chunk counter exhausted").into()
            }
            // Everything else means the stream bytes cannot be
            // trusted.
            OpenError::ChunkTooShort | OpenError::Authentication | OpenError::UnknownFlag => {
                AuthenticationFailed.into()
            }
        }
    }
}

/// The provider primitive: an ordered stream of sealed chunks.
///
/// Implementations own whatever cipher state the construction
/// needs and advance it once per successfully processed chunk.
/// The sealed chunk layout (tag placement, flag encoding) is the
/// implementation's own; layers above pass chunks through as
/// opaque byte sequences.
pub trait SecretStream: Sized {
    /// The stream's secret key.
    type Key: Random;
    /// The per-stream header.
    type Header: Copy;

    /// Bytes added to every sealed chunk.
    const OVERHEAD: usize;
    /// The longest chunk the provider accepts, in bytes.
    const MAX_CHUNK_LEN: u64;

    /// Starts the encrypt side of a stream, producing a fresh
    /// header.
    fn init_push<R: Csprng>(key: &Self::Key, rng: &mut R) -> (Self, Self::Header);

    /// Starts the decrypt side of a stream from a received
    /// header.
    ///
    /// This does not verify that `header` is authentic, only
    /// that it is well formed.
    fn init_pull(key: &Self::Key, header: &Self::Header) -> Result<Self, InvalidHeader>;

    /// Seals one chunk.
    fn push(
        &mut self,
        plaintext: &[u8],
        associated_data: &[u8],
        flag: ChunkFlag,
    ) -> Result<Vec<u8>, SealError>;

    /// Opens one chunk, returning the plaintext and the sender's
    /// flag.
    ///
    /// No plaintext is released on failure.
    fn pull(
        &mut self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<(Vec<u8>, ChunkFlag), OpenError>;
}

/// The direction a [`StreamSession`] was created for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// The session seals chunks.
    Encrypt,
    /// The session opens chunks.
    Decrypt,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Active,
    Finalized,
}

/// A chunked authenticated-encryption session over some
/// [`SecretStream`] provider `S`.
///
/// A session is usable only in the [`Role`] fixed at
/// construction and only until a chunk marked final is
/// processed. Each session is meant to be driven by a single
/// logical caller; independent sessions are fully independent.
/// Dropping a session abandons its stream.
///
/// A decrypt session that never observes a final chunk must be
/// treated by the caller as an incomplete, possibly truncated
/// stream, not silently accepted — check
/// [`is_finalized`][Self::is_finalized] once the transport says
/// the stream is over.
pub struct StreamSession<S> {
    stream: S,
    role: Role,
    state: State,
}

impl<S: SecretStream> StreamSession<S> {
    /// Starts an encrypt session.
    ///
    /// The returned header must be transmitted or stored
    /// alongside the ciphertext, ahead of the first chunk.
    pub fn init_encrypt<R: Csprng>(key: &S::Key, rng: &mut R) -> (Self, S::Header) {
        let (stream, header) = S::init_push(key, rng);
        let session = Self {
            stream,
            role: Role::Encrypt,
            state: State::Active,
        };
        (session, header)
    }

    /// Starts a decrypt session from the header the matching
    /// encrypt session produced.
    ///
    /// The header's authenticity is established only by the
    /// first successful [`pull_chunk`][Self::pull_chunk].
    pub fn init_decrypt(key: &S::Key, header: &S::Header) -> Result<Self, Error> {
        let stream = S::init_pull(key, header)?;
        Ok(Self {
            stream,
            role: Role::Decrypt,
            state: State::Active,
        })
    }

    /// Returns the session's role.
    #[inline]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Reports whether a chunk marked final has been processed.
    #[inline]
    pub const fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized)
    }

    /// Seals the next chunk of the stream.
    ///
    /// Marking `is_final` seals the stream's last chunk: the
    /// marker is bound into the tag so the receiver can detect
    /// truncation, and the session accepts no further chunks.
    pub fn push_chunk(
        &mut self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
        is_final: bool,
    ) -> Result<Vec<u8>, Error> {
        self.ready(Role::Encrypt, "push_chunk")?;
        let flag = if is_final {
            ChunkFlag::Final
        } else {
            ChunkFlag::Message
        };
        let sealed = self
            .stream
            .push(plaintext, associated_data.unwrap_or_default(), flag)?;
        if is_final {
            self.state = State::Finalized;
        }
        Ok(sealed)
    }

    /// Opens the next chunk of the stream, returning the
    /// plaintext and whether the sender marked it final.
    ///
    /// `associated_data` must match what the sender supplied for
    /// this chunk. On [`AuthenticationFailed`] no plaintext is
    /// released and the whole stream must be discarded.
    pub fn pull_chunk(
        &mut self,
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<(Vec<u8>, bool), Error> {
        self.ready(Role::Decrypt, "pull_chunk")?;
        let (plaintext, flag) = self
            .stream
            .pull(ciphertext, associated_data.unwrap_or_default())?;
        let is_final = flag == ChunkFlag::Final;
        if is_final {
            self.state = State::Finalized;
        }
        Ok((plaintext, is_final))
    }

    fn ready(&self, role: Role, op: &'static str) -> Result<(), InvalidState> {
        if self.role != role {
            let reason = match self.role {
                Role::Encrypt => "session only seals chunks",
                Role::Decrypt => "session only opens chunks",
            };
            return Err(InvalidState::new(op, reason));
        }
        match self.state {
            State::Active => Ok(()),
            State::Finalized => Err(InvalidState::new(op, "stream already finalized")),
        }
    }
}

impl<S> fmt::Debug for StreamSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("role", &self.role)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rust::{StreamKey, XChaChaStream};

    fn zero_key() -> StreamKey {
        StreamKey::from([0u8; StreamKey::SIZE])
    }

    /// Key of 32 zero bytes, chunks "hello " and "world", no
    /// associated data, second chunk final: decrypt must yield
    /// ("hello ", false) then ("world", true), and fail if the
    /// chunks are swapped.
    #[test]
    fn test_two_chunk_stream() {
        use crate::default::Rng;

        let key = zero_key();
        let (mut tx, header) = StreamSession::<XChaChaStream>::init_encrypt(&key, &mut Rng);
        let c1 = tx.push_chunk(b"hello ", None, false).expect("seal c1");
        let c2 = tx.push_chunk(b"world", None, true).expect("seal c2");
        assert!(tx.is_finalized());

        let mut rx =
            StreamSession::<XChaChaStream>::init_decrypt(&key, &header).expect("init decrypt");
        let (p1, fin1) = rx.pull_chunk(&c1, None).expect("open c1");
        assert_eq!((p1.as_slice(), fin1), (&b"hello "[..], false));
        assert!(!rx.is_finalized());
        let (p2, fin2) = rx.pull_chunk(&c2, None).expect("open c2");
        assert_eq!((p2.as_slice(), fin2), (&b"world"[..], true));
        assert!(rx.is_finalized());

        // Swapped order must not authenticate.
        let mut rx =
            StreamSession::<XChaChaStream>::init_decrypt(&key, &header).expect("init decrypt");
        assert_eq!(
            rx.pull_chunk(&c2, None),
            Err(Error::AuthenticationFailed(AuthenticationFailed))
        );
    }

    #[test]
    fn test_role_is_enforced() {
        use crate::default::Rng;

        let key = zero_key();
        let (mut tx, header) = StreamSession::<XChaChaStream>::init_encrypt(&key, &mut Rng);
        assert_eq!(tx.role(), Role::Encrypt);
        assert!(matches!(
            tx.pull_chunk(b"whatever whatever", None),
            Err(Error::InvalidState(_))
        ));

        let mut rx =
            StreamSession::<XChaChaStream>::init_decrypt(&key, &header).expect("init decrypt");
        assert_eq!(rx.role(), Role::Decrypt);
        assert!(matches!(
            rx.push_chunk(b"whatever", None, false),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_finalized_rejects_chunks() {
        use crate::default::Rng;

        let key = zero_key();
        let (mut tx, header) = StreamSession::<XChaChaStream>::init_encrypt(&key, &mut Rng);
        let sealed = tx.push_chunk(b"only", None, true).expect("seal");
        assert!(matches!(
            tx.push_chunk(b"more", None, false),
            Err(Error::InvalidState(_))
        ));

        let mut rx =
            StreamSession::<XChaChaStream>::init_decrypt(&key, &header).expect("init decrypt");
        let (_, fin) = rx.pull_chunk(&sealed, None).expect("open");
        assert!(fin);
        assert!(matches!(
            rx.pull_chunk(&sealed, None),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_header_import_checks_length() {
        let bytes = [7u8; 24];
        assert!(Header::<24>::try_from(&bytes[..]).is_ok());
        assert!(Header::<24>::try_from(&bytes[..23]).is_err());
        assert_eq!(Header::<24>::from(bytes).as_bytes(), &bytes);
    }

    #[test]
    fn test_chunk_flag_round_trip() {
        for flag in [ChunkFlag::Message, ChunkFlag::Final] {
            assert_eq!(ChunkFlag::from_byte(flag.to_byte()), Some(flag));
        }
        assert_eq!(ChunkFlag::from_byte(0x7f), None);
    }
}
