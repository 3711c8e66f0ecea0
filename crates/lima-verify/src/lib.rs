//! Content digests and streaming verification for downloaded artifacts.
//!
//! A [`Digest`] is an algorithm-qualified hash in its canonical `algorithm:hex`
//! form. Hashing happens while bytes move: [`VerifiedReader`] wraps any `Read`
//! source and feeds every chunk to a [`Hasher`], so a single pass both copies
//! and digests the content.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use lima_verify::{Algorithm, Digest, VerifiedReader};
//!
//! let expected: Digest =
//!     "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//!         .parse()
//!         .unwrap();
//!
//! let mut reader = VerifiedReader::new(&b"hello world"[..], Algorithm::Sha256.hasher());
//! let mut buffer = Vec::new();
//! reader.read_to_end(&mut buffer).unwrap();
//!
//! reader.verify(&expected).unwrap();
//! ```

pub use self::digest::{Algorithm, Digest};
pub use self::error::{Result, VerifyError};
pub use self::hasher::{AlgorithmHasher, Hasher, Sha256Hasher, Sha384Hasher, Sha512Hasher};
pub use self::reader::VerifiedReader;

mod digest;
mod error;
mod hasher;
mod reader;
