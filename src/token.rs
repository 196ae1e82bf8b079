//! Token positions on the ring
//!
//! A token is a point on the circular space of 2^64 values. Partitioners
//! hash a partition key down to one of these positions; this crate only
//! cares about ordering and distance, never about how tokens are computed.

use serde::{Deserialize, Serialize};

/// Number of distinct token values on the ring (2^64).
pub const RING_LENGTH: i128 = 1 << 64;

/// A position on the token ring.
///
/// Ordered by natural integer comparison. The ring wraps from
/// [`Token::MAX`] back to [`Token::MIN`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Token(i64);

impl Token {
    /// Smallest representable position.
    pub const MIN: Token = Token(i64::MIN);
    /// Largest representable position.
    pub const MAX: Token = Token(i64::MAX);

    /// Create a token from its raw value.
    pub const fn new(value: i64) -> Self {
        Token(value)
    }

    /// Raw value of this token.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Clockwise distance from this token to `other`.
    ///
    /// Always non-negative; computed in a 128-bit domain so the step
    /// across the MAX/MIN boundary cannot overflow.
    pub fn distance_to(self, other: Token) -> u128 {
        let d = other.0 as i128 - self.0 as i128;
        if d < 0 {
            (d + RING_LENGTH) as u128
        } else {
            d as u128
        }
    }
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Token(value)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
