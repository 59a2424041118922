//! Streaming file hasher.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing content digests
//! of files using memory-efficient streaming. A file is read through a
//! fixed-size buffer into the digest accumulator, so memory use does not
//! depend on file size.
//!
//! Two entry points are offered:
//! - [`Hasher::digest`] reports failures as [`HashError`]
//! - [`Hasher::fingerprint`] maps every failure to the empty string, which
//!   callers treat as "unhashable"
//!
//! # Example
//!
//! ```no_run
//! use strataoptima::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Sha256);
//! let hex = hasher.fingerprint(Path::new("some_file.txt"));
//! if hex.is_empty() {
//!     eprintln!("could not read file");
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use digest::Digest;
use serde::{Deserialize, Serialize};

use super::HashError;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Digest function used to fingerprint file content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (128-bit)
    #[default]
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
    /// SHA-256 (256-bit)
    Sha256,
}

impl HashAlgorithm {
    /// Number of hexadecimal characters in a digest.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Sha1 => write!(f, "sha1"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!("Unknown hash algorithm: '{other}'")),
        }
    }
}

/// Streaming content hasher.
///
/// Stateless apart from its settings, so one instance can be shared by
/// reference across worker threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl Hasher {
    /// Create a hasher for the given algorithm with the default buffer size.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the read buffer size. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured buffer size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Compute the lower-case hexadecimal digest of a file.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file doesn't exist
    /// - `NotAFile` if the path is a directory or other non-regular file
    /// - `PermissionDenied` if the file can't be opened
    /// - `Io` if a read fails mid-stream
    pub fn digest(&self, path: &Path) -> Result<String, HashError> {
        let metadata = std::fs::metadata(path).map_err(|e| map_io_error(path, e))?;
        if !metadata.is_file() {
            return Err(HashError::NotAFile(path.to_path_buf()));
        }

        match self.algorithm {
            HashAlgorithm::Md5 => self.stream::<md5::Md5>(path),
            HashAlgorithm::Sha1 => self.stream::<sha1::Sha1>(path),
            HashAlgorithm::Sha256 => self.stream::<sha2::Sha256>(path),
        }
    }

    /// Compute the digest, or the empty string if the file can't be hashed.
    ///
    /// The failure is logged and otherwise swallowed.
    #[must_use]
    pub fn fingerprint(&self, path: &Path) -> String {
        match self.digest(path) {
            Ok(hex) => hex,
            Err(e) => {
                log::warn!("Failed to hash {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    fn stream<D: Digest>(&self, path: &Path) -> Result<String, HashError> {
        let mut file = File::open(path).map_err(|e| map_io_error(path, e))?;
        let mut hasher = D::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

fn map_io_error(path: &Path, error: io::Error) -> HashError {
    match error.kind() {
        io::ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
