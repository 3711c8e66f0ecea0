use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::hasher::{AlgorithmHasher, Hasher};
use crate::{Result, VerifyError};

/// Hash algorithms accepted in a digest string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Also the key function for content that arrives without an expected digest.
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Length of the raw hash output in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    pub fn hasher(self) -> AlgorithmHasher {
        AlgorithmHasher::new(self)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(Algorithm::Sha256),
            "sha384" => Ok(Algorithm::Sha384),
            "sha512" => Ok(Algorithm::Sha512),
            other => Err(VerifyError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// An algorithm-qualified content hash, `algorithm:hex`.
///
/// The encoded part is always lowercase hex of exactly the algorithm's output
/// length, so two digests of the same content compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: Algorithm,
    encoded: String,
}

impl Digest {
    /// Caller guarantees `bytes` is a finalized hash of `algorithm`.
    pub(crate) fn from_hash(algorithm: Algorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            encoded: hex::encode(bytes),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The hex part, without the algorithm prefix.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Digest everything `reader` yields.
    pub fn of_reader(algorithm: Algorithm, mut reader: impl Read) -> io::Result<Self> {
        let mut hasher = algorithm.hasher();
        let mut buffer = [0u8; 64 * 1024];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(hasher.digest())
    }

    pub fn of_file(algorithm: Algorithm, path: impl AsRef<Path>) -> io::Result<Self> {
        Self::of_reader(algorithm, File::open(path)?)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.encoded)
    }
}

impl FromStr for Digest {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| VerifyError::InvalidDigest {
            digest: s.to_string(),
            reason,
        };

        let (algorithm, encoded) = s
            .split_once(':')
            .ok_or_else(|| invalid("missing algorithm prefix"))?;
        let algorithm: Algorithm = algorithm.parse()?;

        if encoded.len() != algorithm.output_len() * 2 {
            return Err(invalid("length does not match the algorithm"));
        }
        if !encoded.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(invalid("encoded part must be lowercase hex"));
        }

        Ok(Self {
            algorithm,
            encoded: encoded.to_string(),
        })
    }
}
