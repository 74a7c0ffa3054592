//! Identifier type used throughout the tenant store.
//!
//! An [`Id`] is a non-zero `u64`. Its key encoding is 16 lowercase hex
//! ASCII bytes, so byte-wise key order equals numeric order.

use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of an encoded [`Id`].
pub const ID_ENCODED_LEN: usize = 16;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Unique identifier for a tenant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id(u64);

impl Id {
    /// The zero id. Never assigned to a stored record.
    pub const INVALID: Id = Id(0);

    /// Creates an id from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Whether this id may be assigned to a record.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Encodes the id as fixed-width lowercase hex.
    #[must_use]
    pub fn encode(&self) -> [u8; ID_ENCODED_LEN] {
        let mut out = [0u8; ID_ENCODED_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            let shift = (ID_ENCODED_LEN - 1 - i) * 4;
            *byte = HEX[((self.0 >> shift) & 0xf) as usize];
        }
        out
    }

    /// Decodes an id previously produced by [`Id::encode`]. Only the
    /// canonical lowercase form is accepted.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != ID_ENCODED_LEN {
            return Err(Error::InvalidId(format!(
                "expected {ID_ENCODED_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut value = 0u64;
        for &b in bytes {
            let nibble = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                _ => {
                    return Err(Error::InvalidId(format!(
                        "invalid lowercase hex byte {:?}",
                        char::from(b)
                    )));
                }
            };
            value = (value << 4) | u64::from(nibble);
        }
        Ok(Self(value))
    }

    /// Parses an id from its 16-character lowercase hex form.
    pub fn parse(s: &str) -> Result<Self, Error> {
        Self::decode(s.as_bytes())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
