//! Token range arithmetic
//!
//! A range is the arc walked clockwise from just after `start` to `end`
//! (exclusive-start, inclusive-end). Ranges may wrap across the MAX/MIN
//! boundary, and `(MIN, MIN]` built via [`TokenRange::full_ring`] denotes
//! the entire ring.

use serde::{Deserialize, Serialize};

use crate::token::{Token, RING_LENGTH};

/// A half-open arc `(start, end]` on the token ring.
///
/// Wraps around when `end < start`. A range with `start == end` is empty,
/// except for the reserved `(MIN, MIN]` which means the whole ring; use
/// [`TokenRange::full_ring`] to construct it rather than relying on the
/// raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRange {
    start: Token,
    end: Token,
}

impl TokenRange {
    /// Create a range covering `(start, end]`.
    pub const fn new(start: Token, end: Token) -> Self {
        Self { start, end }
    }

    /// The range covering the entire ring.
    pub const fn full_ring() -> Self {
        Self {
            start: Token::MIN,
            end: Token::MIN,
        }
    }

    /// Exclusive start of the arc.
    pub const fn start(&self) -> Token {
        self.start
    }

    /// Inclusive end of the arc.
    pub const fn end(&self) -> Token {
        self.end
    }

    /// True for the reserved whole-ring range `(MIN, MIN]`.
    pub fn is_full_ring(&self) -> bool {
        self.start == Token::MIN && self.end == Token::MIN
    }

    /// True when the arc contains no tokens.
    pub fn is_empty(&self) -> bool {
        self.start == self.end && !self.is_full_ring()
    }

    /// True when the arc crosses the MAX/MIN boundary.
    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    /// Number of tokens in the arc.
    pub fn len(&self) -> u128 {
        if self.is_full_ring() {
            RING_LENGTH as u128
        } else {
            self.start.distance_to(self.end)
        }
    }

    /// Wraparound-aware arc membership.
    pub fn contains(&self, token: Token) -> bool {
        if self.is_full_ring() {
            return true;
        }
        if self.start < self.end {
            self.start < token && token <= self.end
        } else if self.start > self.end {
            token > self.start || token <= self.end
        } else {
            false
        }
    }

    /// True if the two arcs share at least one token.
    ///
    /// Two non-empty arcs intersect exactly when either contains the
    /// other's end token.
    pub fn overlaps(&self, other: &TokenRange) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.is_full_ring() || other.is_full_ring() {
            return true;
        }
        self.contains(other.end) || other.contains(self.end)
    }

    /// Split the arc into `number_of_splits` contiguous sub-ranges of
    /// near-equal length that exactly tile it.
    ///
    /// Lengths differ by at most one token: the remainder of the division
    /// is spread over the first `len % number_of_splits` parts. All
    /// arithmetic runs in a 128-bit domain so boundaries computed across
    /// the MAX/MIN wrap lose no precision; values walking past `MAX` are
    /// brought back into range by subtracting the ring length.
    ///
    /// # Panics
    ///
    /// Panics if `number_of_splits` is zero or the range is empty. An
    /// empty range reaching this point is a logic error in whatever
    /// decoded it, not a recoverable condition.
    pub fn split(&self, number_of_splits: usize) -> Vec<TokenRange> {
        assert!(number_of_splits >= 1, "number_of_splits must be at least 1");
        assert!(!self.is_empty(), "cannot split an empty token range");

        // (MIN, MIN] means the whole ring; substitute MAX as the end so
        // the length computation below sees the full arc.
        let end = if self.is_full_ring() {
            Token::MAX
        } else {
            self.end
        };

        let mut length = end.value() as i128 - self.start.value() as i128;
        if length < 0 {
            length += RING_LENGTH;
        }

        let parts = number_of_splits as i128;
        let base = length / parts;
        let remainder = length % parts;

        let mut ranges = Vec::with_capacity(number_of_splits);
        let mut cursor = self.start;
        for i in 0..parts {
            let step = base + if i < remainder { 1 } else { 0 };
            let mut next = cursor.value() as i128 + step;
            if next > Token::MAX.value() as i128 {
                next -= RING_LENGTH;
            }
            let next = Token::new(next as i64);
            ranges.push(TokenRange::new(cursor, next));
            cursor = next;
        }
        ranges
    }
}

impl std::fmt::Display for TokenRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: i64, end: i64) -> TokenRange {
        TokenRange::new(Token::new(start), Token::new(end))
    }

    #[test]
    fn test_contains_plain() {
        let r = range(100, 200);
        assert!(!r.contains(Token::new(100))); // exclusive start
        assert!(r.contains(Token::new(101)));
        assert!(r.contains(Token::new(200))); // inclusive end
        assert!(!r.contains(Token::new(201)));
    }

    #[test]
    fn test_contains_wrapped() {
        let r = range(900, 50);
        assert!(r.contains(Token::new(901)));
        assert!(r.contains(Token::MAX));
        assert!(r.contains(Token::MIN));
        assert!(r.contains(Token::new(50)));
        assert!(!r.contains(Token::new(51)));
        assert!(!r.contains(Token::new(900)));
    }

    #[test]
    fn test_full_ring_contains_everything() {
        let r = TokenRange::full_ring();
        assert!(r.contains(Token::MIN));
        assert!(r.contains(Token::MAX));
        assert!(r.contains(Token::new(0)));
        assert!(r.is_full_ring());
        assert!(!r.is_empty());
    }

    #[test]
    fn test_empty_range_contains_nothing() {
        let r = range(42, 42);
        assert!(r.is_empty());
        assert!(!r.contains(Token::new(42)));
        assert!(!r.contains(Token::new(43)));
    }

    #[test]
    fn test_overlaps() {
        assert!(range(0, 300).overlaps(&range(250, 800)));
        assert!(range(700, 1000).overlaps(&range(250, 800)));
        assert!(!range(300, 700).overlaps(&range(700, 1000)));
        assert!(range(100, 200).overlaps(&range(100, 200)));
        // One arc strictly inside the other.
        assert!(range(0, 1000).overlaps(&range(400, 500)));
        assert!(range(400, 500).overlaps(&range(0, 1000)));
        // Wrapped vs plain.
        assert!(range(900, 50).overlaps(&range(1000, 2000)));
        assert!(!range(900, 50).overlaps(&range(100, 200)));
        // Full ring overlaps everything non-empty.
        assert!(TokenRange::full_ring().overlaps(&range(1, 2)));
        assert!(!TokenRange::full_ring().overlaps(&range(5, 5)));
    }

    #[test]
    fn test_split_even() {
        let parts = range(0, 1000).split(4);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], range(0, 250));
        assert_eq!(parts[1], range(250, 500));
        assert_eq!(parts[2], range(500, 750));
        assert_eq!(parts[3], range(750, 1000));
    }

    #[test]
    fn test_split_distributes_remainder_to_first_parts() {
        let parts = range(0, 10).split(3);
        assert_eq!(
            parts.iter().map(|r| r.len()).collect::<Vec<_>>(),
            vec![4, 3, 3]
        );
        assert_eq!(parts[0], range(0, 4));
        assert_eq!(parts[2], range(7, 10));
    }

    #[test]
    fn test_split_tiles_exactly() {
        let r = range(-5000, 7777);
        let parts = r.split(7);
        assert_eq!(parts[0].start(), r.start());
        assert_eq!(parts.last().unwrap().end(), r.end());
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        let total: u128 = parts.iter().map(|p| p.len()).sum();
        assert_eq!(total, r.len());
        let max = parts.iter().map(|p| p.len()).max().unwrap();
        let min = parts.iter().map(|p| p.len()).min().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn test_split_across_wrap_boundary() {
        let r = range(i64::MAX - 10, i64::MIN + 10);
        assert!(r.wraps());
        assert_eq!(r.len(), 21);
        let parts = r.split(3);
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![7, 7, 7]);
        assert_eq!(parts[0].start(), r.start());
        assert_eq!(parts.last().unwrap().end(), r.end());
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        // The middle boundary must have wrapped back into range.
        assert!(parts.iter().any(|p| p.wraps()));
    }

    #[test]
    fn test_split_whole_ring() {
        let parts = TokenRange::full_ring().split(4);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].start(), Token::MIN);
        assert_eq!(parts.last().unwrap().end(), Token::MAX);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        let total: u128 = parts.iter().map(|p| p.len()).sum();
        // (MIN, MIN] is computed as (MIN, MAX], one token short of 2^64.
        assert_eq!(total, (RING_LENGTH - 1) as u128);
    }

    #[test]
    fn test_split_single_part_is_identity() {
        let r = range(10, 20);
        assert_eq!(r.split(1), vec![r]);
    }

    #[test]
    #[should_panic(expected = "empty token range")]
    fn test_split_empty_range_panics() {
        range(7, 7).split(2);
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn test_split_zero_parts_panics() {
        range(0, 10).split(0);
    }
}
