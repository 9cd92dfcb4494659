//! Session PIN generation and management
//!
//! This module provides the short numeric codes players type to join a
//! running session. PINs are fixed-width decimal numbers so they are easy
//! to read out loud and to enter on a phone keypad.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Minimum value for generated PINs (inclusive)
const MIN_VALUE: u32 = 100_000;
/// Maximum value for generated PINs (exclusive)
const MAX_VALUE: u32 = 1_000_000;

/// A six-digit code identifying one active game session
///
/// PINs are generated uniformly at random within the six-digit decimal
/// range. Generation alone does not guarantee uniqueness; the session
/// registry is responsible for regenerating on collision with an active
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin(u32);

impl Pin {
    /// Creates a new random PIN
    ///
    /// The value always formats as exactly six decimal digits.
    pub fn new() -> Self {
        Self(fastrand::u32(MIN_VALUE..MAX_VALUE))
    }
}

impl Default for Pin {
    /// Creates a new random PIN (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Pin {
    /// Formats the PIN as a six-digit decimal number
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl Serialize for Pin {
    /// Serializes the PIN as a six-digit decimal string
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pin {
    /// Deserializes a PIN from its decimal string representation
    fn deserialize<D>(deserializer: D) -> Result<Pin, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pin::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl FromStr for Pin {
    type Err = ParseIntError;

    /// Parses a PIN from a decimal string representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string cannot be parsed as a
    /// decimal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_pin_new_in_range() {
        for _ in 0..100 {
            let pin = Pin::new();
            assert!(pin.0 >= MIN_VALUE);
            assert!(pin.0 < MAX_VALUE);
        }
    }

    #[test]
    fn test_pin_display_is_six_digits() {
        let pin = Pin(MIN_VALUE);
        assert_eq!(pin.to_string(), "100000");

        let pin = Pin(MAX_VALUE - 1);
        assert_eq!(pin.to_string(), "999999");

        for _ in 0..100 {
            assert_eq!(Pin::new().to_string().len(), 6);
        }
    }

    #[test]
    fn test_pin_from_str() {
        let pin = Pin::from_str("100000").unwrap();
        assert_eq!(pin.0, MIN_VALUE);

        let pin = Pin::from_str("654321").unwrap();
        assert_eq!(pin.0, 654_321);
    }

    #[test]
    fn test_pin_from_str_invalid() {
        assert!(Pin::from_str("invalid").is_err());
        assert!(Pin::from_str("12a456").is_err());
        assert!(Pin::from_str("").is_err());
    }

    #[test]
    fn test_pin_serialization_round_trip() {
        let pin = Pin(123_456);
        let serialized = serde_json::to_string(&pin).unwrap();
        assert_eq!(serialized, "\"123456\"");

        let deserialized: Pin = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, pin);
    }

    #[test]
    fn test_pin_deserialization_rejects_numbers() {
        let result: Result<Pin, _> = serde_json::from_str("123456");
        assert!(result.is_err());
    }

    #[test]
    fn test_pin_hash_equality() {
        use std::collections::HashMap;

        let a = Pin(111_111);
        let b = Pin(111_111);
        let c = Pin(222_222);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut map = HashMap::new();
        map.insert(a, "first");
        map.insert(c, "second");

        assert_eq!(map.get(&b), Some(&"first"));
        assert_eq!(map.len(), 2);
    }
}
