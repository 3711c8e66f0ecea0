use std::io::{self, Read};

use crate::{AlgorithmHasher, Digest, Hasher, Result, VerifyError};

/// Streaming reader that hashes data as it passes through.
/// Wraps any `Read` source so copying and digesting take a single pass.
pub struct VerifiedReader<R, H> {
    reader: R,
    hasher: H,
    bytes_read: u64,
}

impl<R, H> VerifiedReader<R, H> {
    /// Create a new verified reader.
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            bytes_read: 0,
        }
    }

    /// Total bytes that have passed through the hasher.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }
}

impl<R> VerifiedReader<R, AlgorithmHasher> {
    /// Digest of everything read so far.
    pub fn digest(self) -> Digest {
        self.hasher.digest()
    }

    /// Finalize and compare against `expected`, returning the derived digest.
    ///
    /// Comparison is exact on the canonical form, so a digest of a different
    /// algorithm never matches.
    pub fn verify(self, expected: &Digest) -> Result<Digest> {
        let actual = self.digest();
        if &actual == expected {
            Ok(actual)
        } else {
            Err(VerifyError::Mismatch {
                expected: expected.clone(),
                actual,
            })
        }
    }
}
