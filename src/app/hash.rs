//! SHA-1 digest value type used for asset verification
//!
//! Catalog checksums arrive as hex strings in whatever case the server
//! prefers. Parsing them into a fixed 20-byte value makes the comparison with
//! a locally computed digest case-insensitive by construction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;

use crate::constants::download::HASH_BUFFER_SIZE;
use crate::errors::DownloadError;

/// SHA-1 digest stored as its raw 20 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Hash([u8; 20]);

impl Sha1Hash {
    /// Parse a 40-character hex string (case insensitive)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nexus_mirror::app::Sha1Hash;
    ///
    /// let lower = Sha1Hash::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709")?;
    /// let upper = Sha1Hash::from_hex("DA39A3EE5E6B4B0D3255BFEF95601890AFD80709")?;
    /// assert_eq!(lower, upper);
    /// # Ok::<(), nexus_mirror::errors::DownloadError>(())
    /// ```
    pub fn from_hex(value: &str) -> Result<Self, DownloadError> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(value.trim(), &mut bytes).map_err(|_| {
            DownloadError::InvalidChecksum {
                value: value.to_string(),
            }
        })?;
        Ok(Sha1Hash(bytes))
    }

    /// Lowercase 40-character hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Digest of an in-memory buffer
    pub fn digest_bytes(data: &[u8]) -> Self {
        Sha1Hash(Sha1::digest(data).into())
    }

    /// Digest of a file's current contents, read in fixed-size chunks
    pub async fn digest_file(path: &Path) -> std::io::Result<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(Sha1Hash(hasher.finalize().into()))
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Sha1Hash {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Sha1Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha1Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}
