//! deterministic identifiers
//!
//! Generated templates must be byte-identical between runs, so every generated symbolic name is derived from a
//! seed string instead of randomness:
//!
//! - [allocate]: first 4 bytes of the SHA-1 digest of the seed, as 8 uppercase hex characters
//! - [allocate_guid]: the MD5 digest of the seed, read as a GUID (little-endian field order)
//!
//! Distinct seeds may collide. [IdentifierAllocator] is a registry scoped to a single synthesis run that turns such a
//! collision into an [Error::IdentifierCollision] instead of two resources silently sharing a name.
use crate::error::{Error, Result};
use md5::Md5;
use sha1::{Digest, Sha1};

/// Length of an identifier returned by [allocate]
pub const IDENTIFIER_LEN: usize = 8;

pub fn allocate(seed: &str) -> String {
    let digest = Sha1::digest(seed.as_bytes());
    hex::encode_upper(&digest[..IDENTIFIER_LEN / 2])
}

pub fn allocate_guid(seed: &str) -> uuid::Uuid {
    let digest = Md5::digest(seed.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    uuid::Uuid::from_bytes_le(bytes)
}

/// Identifiers handed out during one synthesis run
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    /// identifier -> seed it was allocated for
    issued: indexmap::IndexMap<String, String>,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the identifier for `seed`
    ///
    /// Allocating the same seed twice returns the same identifier. A different seed that maps to an identifier
    /// already issued is rejected.
    pub fn allocate(&mut self, seed: &str) -> Result<String> {
        let identifier = allocate(seed);

        match self.issued.get(&identifier) {
            Some(existing) if existing != seed => {
                tracing::debug!(%identifier, first = %existing, second = %seed, "identifier collision");
                Err(Error::IdentifierCollision {
                    identifier,
                    first: existing.clone(),
                    second: seed.to_string(),
                })
            }
            Some(_) => Ok(identifier),
            None => {
                tracing::trace!(%identifier, %seed, "identifier allocated");
                self.issued.insert(identifier.clone(), seed.to_string());
                Ok(identifier)
            }
        }
    }

    /// Allocates the identifier for `seed` and prepends `prefix`
    pub fn allocate_prefixed(&mut self, prefix: &str, seed: &str) -> Result<String> {
        Ok(format!("{prefix}{}", self.allocate(seed)?))
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Seeds in allocation order, paired with their identifiers
    pub fn issued(&self) -> impl Iterator<Item = (&str, &str)> {
        self.issued
            .iter()
            .map(|(identifier, seed)| (seed.as_str(), identifier.as_str()))
    }

    #[cfg(test)]
    fn force(&mut self, identifier: &str, seed: &str) {
        self.issued.insert(identifier.to_string(), seed.to_string());
    }
}
