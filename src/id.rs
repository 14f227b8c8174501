//! Random identifiers for users and sessions.
//!
//! An [`Identifier`] is 128 bits from the operating system CSPRNG. Its
//! canonical text form is URL-safe base64 without padding (22 characters),
//! which is what travels in the session cookie and what the backend stores.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of random bytes in an identifier.
pub const IDENTIFIER_LEN: usize = 16;

/// Length of the canonical text encoding.
pub const IDENTIFIER_TEXT_LEN: usize = 22;

/// Identifier errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The entropy source failed.
    #[error("identifier generation failed: {0}")]
    Generation(String),

    /// The text is not a canonical identifier.
    #[error("malformed identifier")]
    Format,
}

/// Opaque identifier shared by persons and sessions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    /// Generate a new random identifier.
    ///
    /// Fails only if the operating system cannot provide randomness.
    pub fn new() -> Result<Self, IdentifierError> {
        let mut bytes = [0u8; IDENTIFIER_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| IdentifierError::Generation(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Parse the canonical text form.
    ///
    /// # Examples
    ///
    /// ```
    /// use floodwatch_auth::Identifier;
    ///
    /// let id = Identifier::new().unwrap();
    /// assert_eq!(Identifier::parse(&id.to_string()).unwrap(), id);
    /// assert!(Identifier::parse("not-an-id").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        if text.len() != IDENTIFIER_TEXT_LEN {
            return Err(IdentifierError::Format);
        }

        let decoded = URL_SAFE_NO_PAD
            .decode(text)
            .map_err(|_| IdentifierError::Format)?;
        let bytes: [u8; IDENTIFIER_LEN] =
            decoded.try_into().map_err(|_| IdentifierError::Format)?;

        Ok(Self(bytes))
    }

    /// Build an identifier from raw bytes.
    pub fn from_bytes(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
