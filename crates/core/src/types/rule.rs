//! Piece-to-carton conversion rule.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of pieces in one carton of a product or variant.
///
/// Always at least 1. A rule of 1 makes a carton the same unit as a piece.
/// Catalog and persisted data sometimes carry `0` or omit the field; both
/// normalise to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rule(NonZeroU32);

impl Rule {
    /// One piece per carton.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Build a rule, treating 0 as 1.
    #[must_use]
    pub fn new(pieces_per_carton: u32) -> Self {
        NonZeroU32::new(pieces_per_carton).map_or(Self::ONE, Self)
    }

    /// Build a rule from an optional raw value, treating absent or 0 as 1.
    #[must_use]
    pub fn from_raw(raw: Option<u32>) -> Self {
        raw.map_or(Self::ONE, Self::new)
    }

    /// Pieces per carton.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Piece-equivalent quantity of `pieces` loose pieces plus `cartons` cartons.
    #[must_use]
    pub fn piece_equivalent(self, pieces: u32, cartons: u32) -> u64 {
        u64::from(pieces) + u64::from(cartons) * u64::from(self.get())
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pcs/carton", self.0)
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_missing_normalise_to_one() {
        assert_eq!(Rule::new(0), Rule::ONE);
        assert_eq!(Rule::from_raw(None), Rule::ONE);
        assert_eq!(Rule::from_raw(Some(0)).get(), 1);
    }

    #[test]
    fn test_piece_equivalent() {
        assert_eq!(Rule::new(12).piece_equivalent(3, 2), 27);
        assert_eq!(Rule::ONE.piece_equivalent(2, 0), 2);
        assert_eq!(Rule::ONE.piece_equivalent(1, 1), 2);
    }

    #[test]
    fn test_piece_equivalent_does_not_overflow() {
        let rule = Rule::new(u32::MAX);
        let expected = u64::from(u32::MAX) + u64::from(u32::MAX) * u64::from(u32::MAX);
        assert_eq!(rule.piece_equivalent(u32::MAX, u32::MAX), expected);
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Rule::new(12)).unwrap(), "12");
        let parsed: Rule = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, Rule::ONE);
    }
}
