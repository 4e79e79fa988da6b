//! Arity: how many occurrences (or positional values) a parameter takes.

use std::fmt;

/// Declared cardinality, stored in its signed encoding.
///
/// Positive `n` means exactly `n`. Negative `n` means at least `|n| - 1`,
/// so `-1` is "zero or more" and `-2` is "one or more". Zero is rejected
/// when the parameter is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity(i64);

impl Arity {
    pub const ONE: Arity = Arity(1);
    pub const ZERO_OR_MORE: Arity = Arity(-1);
    pub const ONE_OR_MORE: Arity = Arity(-2);

    pub fn exactly(n: u32) -> Self {
        Arity(i64::from(n))
    }

    pub fn at_least(k: u32) -> Self {
        Arity(-(i64::from(k) + 1))
    }

    pub fn from_raw(raw: i64) -> Self {
        Arity(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Repeated occurrences accumulate instead of overwriting.
    pub fn is_multiple(&self) -> bool {
        self.0 < 0 || self.0.abs() > 1
    }

    /// `Some(n)` for exact arities.
    pub fn exact(&self) -> Option<usize> {
        (self.0 > 0).then_some(self.0 as usize)
    }

    /// Smallest count that satisfies the arity.
    pub fn minimum(&self) -> usize {
        if self.0 > 0 {
            self.0 as usize
        } else {
            (self.0.unsigned_abs() as usize).saturating_sub(1)
        }
    }

    pub fn allows_zero(&self) -> bool {
        self.0 == -1
    }

    /// Whether `count` occurrences satisfy this arity.
    pub fn accepts(&self, count: usize) -> bool {
        match self.exact() {
            Some(n) => n == count,
            None => count >= self.minimum(),
        }
    }
}

impl Default for Arity {
    fn default() -> Self {
        Arity::ONE
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exact() {
            Some(n) => write!(f, "{}", n),
            None if self.allows_zero() => f.write_str("any"),
            None => write!(f, "at least {}", self.minimum()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_encoding() {
        assert_eq!(Arity::at_least(0), Arity::ZERO_OR_MORE);
        assert_eq!(Arity::at_least(1), Arity::ONE_OR_MORE);
        assert_eq!(Arity::at_least(3).raw(), -4);
        assert_eq!(Arity::at_least(3).minimum(), 3);
        assert_eq!(Arity::exactly(2).minimum(), 2);
    }

    #[test]
    fn multiplicity() {
        assert!(!Arity::ONE.is_multiple());
        assert!(Arity::exactly(2).is_multiple());
        assert!(Arity::ZERO_OR_MORE.is_multiple());
        assert!(Arity::ONE_OR_MORE.is_multiple());
    }

    #[test]
    fn accepts_counts() {
        assert!(Arity::exactly(2).accepts(2));
        assert!(!Arity::exactly(2).accepts(3));
        assert!(Arity::at_least(2).accepts(5));
        assert!(!Arity::at_least(2).accepts(1));
        assert!(Arity::ZERO_OR_MORE.accepts(0));
    }

    #[test]
    fn zero_is_invalid() {
        assert!(!Arity::from_raw(0).is_valid());
        assert!(Arity::from_raw(-1).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(Arity::exactly(3).to_string(), "3");
        assert_eq!(Arity::ZERO_OR_MORE.to_string(), "any");
        assert_eq!(Arity::at_least(2).to_string(), "at least 2");
    }
}
