use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::borrow::Borrow;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// An opaque 32-byte value
///
/// Used both for caller supplied content digests and for the node hashes computed by the
/// accumulator. Formats and serializes as a `0x`-prefixed hex string.
///
/// ```rust
/// # use primitives::Hash;
/// let s = "0x00000000000000000000000000000000000000000000000000000000000000ff";
/// let hash: Hash = s.parse().unwrap();
///
/// assert_eq!(hash, Hash::from_u64(255));
/// assert_eq!(hash.to_string(), s);
/// ```
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The number of bytes in a [`Hash`]
    pub const SIZE: usize = 32;

    /// The all-zero value
    ///
    /// This is the root of an empty accumulator, and is never accepted as a fingerprint
    pub const ZERO: Self = Self([0; 32]);

    /// Wrap 32 raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Encode `n` as a big-endian 256-bit word
    ///
    /// ```rust
    /// # use primitives::Hash;
    /// let hash = Hash::from_u64(1);
    /// assert_eq!(hash.inner()[31], 1);
    /// assert!(hash.inner()[..31].iter().all(|b| *b == 0));
    /// ```
    #[inline]
    #[must_use]
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..32].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Whether every byte is zero
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Borrow the raw bytes
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &[u8; 32] {
        &self.0
    }

    /// Take the raw bytes
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> [u8; 32] {
        self.0
    }

    /// Hex encoding without the `0x` prefix
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Keccak-256 digest of `bytes`
///
/// ```rust
/// # use primitives::keccak256;
/// // the well known digest of the empty string
/// assert_eq!(
///     keccak256(b"").to_string(),
///     "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
/// );
/// ```
#[inline]
#[must_use]
pub fn keccak256(bytes: impl AsRef<[u8]>) -> Hash {
    Hash(Keccak256::digest(bytes.as_ref()).into())
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for [u8; 32] {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for Hash {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// The error returned when parsing a [`Hash`] from a string fails
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseHashError {
    /// The string was not valid hex
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The string decoded to the wrong number of bytes
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

impl FromStr for Hash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let len = bytes.len();
        let bytes = <[u8; 32]>::try_from(bytes).map_err(|_| ParseHashError::Length(len))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn parses_with_and_without_prefix() {
        let s = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

        let a: Hash = s.parse().unwrap();
        let b: Hash = format!("0x{s}").parse().unwrap();

        assert_eq!(a, b);
        assert_eq!(a, keccak256(b""));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = "0x0123".parse::<Hash>().unwrap_err();
        assert!(matches!(err, ParseHashError::Length(2)));

        let err = "0xzz".parse::<Hash>().unwrap_err();
        assert!(matches!(err, ParseHashError::Hex(_)));
    }

    #[test]
    fn zero_is_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(Hash::default().is_zero());
        assert!(!Hash::from_u64(1).is_zero());
    }

    #[proptest]
    fn serde_json_is_hex_string(hash: Hash) {
        let value = serde_json::to_value(hash).unwrap();
        assert_eq!(value, serde_json::Value::String(hash.to_string()));

        let again: Hash = serde_json::from_value(value).unwrap();
        assert_eq!(hash, again);
    }

    #[test]
    fn deserialize_rejects_bad_hex() {
        let err = serde_json::from_str::<Hash>("\"0x0123\"").unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes"));
    }

    #[proptest]
    fn borsh_is_raw_bytes(hash: Hash) {
        let bytes = borsh::to_vec(&hash).unwrap();
        assert_eq!(bytes, hash.0.to_vec());
    }
}
