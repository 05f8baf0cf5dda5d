//! Session layer over streaming authenticated encryption and
//! generic hashing.
//!
//! This crate wraps two provider primitives behind small, safe
//! session types:
//!
//! - [`hash::GenericHash`]: an incremental, optionally keyed
//!   hash with a runtime-chosen digest length.
//! - [`secretstream::StreamSession`]: chunked authenticated
//!   encryption over an ordered byte stream, with a per-stream
//!   header, per-chunk associated data, and a final-chunk marker
//!   that makes truncation detectable.
//!
//! The two are independent; compose them in the caller if you
//! need both. Key distribution and header transport are the
//! calling application's responsibility.
//!
//! Default providers live in [`rust`]: BLAKE2b for hashing and
//! XChaCha20-Poly1305 for the stream.
//!
//! Each session is meant to be driven by one logical caller at a
//! time; sessions are cheap, so give every concurrent task its
//! own. No operation blocks or performs I/O.
//!
//! # Example
//!
//! ```
//! use sealstream::{
//!     default::Rng,
//!     hash::GenericHash,
//!     rust::{Blake2b, StreamKey, XChaChaStream},
//!     secretstream::StreamSession,
//! };
//!
//! # fn main() -> Result<(), sealstream::Error> {
//! let digest = Blake2b::hash(32, None, b"attack at dawn")?;
//! assert_eq!(digest.len(), 32);
//!
//! let key = StreamKey::generate(&mut Rng);
//! let (mut tx, header) = StreamSession::<XChaChaStream>::init_encrypt(&key, &mut Rng);
//! let c1 = tx.push_chunk(b"hello ", None, false)?;
//! let c2 = tx.push_chunk(b"world", None, true)?;
//!
//! let mut rx = StreamSession::<XChaChaStream>::init_decrypt(&key, &header)?;
//! let (p1, fin1) = rx.pull_chunk(&c1, None)?;
//! let (p2, fin2) = rx.pull_chunk(&c2, None)?;
//! assert_eq!((p1.as_slice(), fin1), (&b"hello "[..], false));
//! assert_eq!((p2.as_slice(), fin2), (&b"world"[..], true));
//! assert!(rx.is_finalized());
//! # Ok(()) }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

pub mod csprng;
pub mod default;
pub mod error;
pub mod hash;
pub mod keys;
pub mod rust;
pub mod secretstream;
pub mod test_util;

pub use error::Error;
