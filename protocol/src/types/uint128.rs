//! # 128-bit Amounts
//!
//! Token amounts on MMX may exceed 64 bits, so every amount is a
//! [`Uint128`]: two little-endian 64-bit limbs. The canonical encoder writes
//! the lower limb first, then the upper limb.
//!
//! In JSON an amount is a plain number while it fits in 64 bits and a
//! decimal string beyond that, which keeps documents readable without
//! losing precision in parsers that squeeze numbers through `f64`.

use std::cmp::Ordering;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TypeError;

/// An unsigned integer in `[0, 2^128)`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Uint128 {
    lower: u64,
    upper: u64,
}

impl Uint128 {
    /// Zero.
    pub const ZERO: Self = Self { lower: 0, upper: 0 };

    /// `2^128 - 1`.
    pub const MAX: Self = Self {
        lower: u64::MAX,
        upper: u64::MAX,
    };

    /// Builds a value from its limbs.
    pub const fn from_limbs(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }

    /// Lossless conversion from a native `u128`.
    pub const fn from_u128(value: u128) -> Self {
        Self {
            lower: value as u64,
            upper: (value >> 64) as u64,
        }
    }

    /// Low 64 bits.
    pub const fn lower(&self) -> u64 {
        self.lower
    }

    /// High 64 bits.
    pub const fn upper(&self) -> u64 {
        self.upper
    }

    /// The value as a native `u128`.
    pub const fn to_u128(&self) -> u128 {
        ((self.upper as u128) << 64) | self.lower as u128
    }

    /// The value as `u64`, or `None` when the upper limb is set.
    pub fn to_u64(&self) -> Option<u64> {
        (self.upper == 0).then_some(self.lower)
    }

    /// Returns `true` for zero.
    pub fn is_zero(&self) -> bool {
        self.lower == 0 && self.upper == 0
    }

    /// Checked addition; `None` on overflow past `2^128 - 1`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.to_u128().checked_add(rhs.to_u128()).map(Self::from_u128)
    }

    /// Checked subtraction; `None` when `rhs > self`.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.to_u128().checked_sub(rhs.to_u128()).map(Self::from_u128)
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self::from_u128(self.to_u128().saturating_sub(rhs.to_u128()))
    }

    /// Parses a decimal or `0x`-prefixed hexadecimal literal.
    pub fn parse_literal(text: &str) -> Result<Self, TypeError> {
        let trimmed = text.trim();
        if trimmed.starts_with('-') {
            return Err(TypeError::OutOfRange(trimmed.to_string()));
        }
        let (digits, radix) = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (trimmed, 10),
        };
        u128::from_str_radix(digits, radix)
            .map(Self::from_u128)
            .map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow => TypeError::OutOfRange(trimmed.to_string()),
                _ => TypeError::InvalidInteger(trimmed.to_string()),
            })
    }
}

impl Ord for Uint128 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_u128().cmp(&other.to_u128())
    }
}

impl PartialOrd for Uint128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u128> for Uint128 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<u64> for Uint128 {
    fn from(value: u64) -> Self {
        Self::from_limbs(value, 0)
    }
}

impl From<u32> for Uint128 {
    fn from(value: u32) -> Self {
        Self::from_limbs(value as u64, 0)
    }
}

impl From<Uint128> for u128 {
    fn from(value: Uint128) -> Self {
        value.to_u128()
    }
}

impl TryFrom<i128> for Uint128 {
    type Error = TypeError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        u128::try_from(value)
            .map(Self::from_u128)
            .map_err(|_| TypeError::OutOfRange(value.to_string()))
    }
}

impl TryFrom<i64> for Uint128 {
    type Error = TypeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_from(value as i128)
    }
}

impl FromStr for Uint128 {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_literal(s)
    }
}

impl fmt::Display for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_u128())
    }
}

impl fmt::Debug for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint128({})", self.to_u128())
    }
}

impl Serialize for Uint128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_u64() {
            Some(small) => serializer.serialize_u64(small),
            None => serializer.collect_str(self),
        }
    }
}

struct Uint128Visitor;

impl<'de> Visitor<'de> for Uint128Visitor {
    type Value = Uint128;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer below 2^128, as a number or a decimal/hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Uint128::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(Uint128::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Uint128::try_from(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "amount {v} is not an exact integer; encode large amounts as strings"
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Uint128::parse_literal(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Uint128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(Uint128Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_POW_128: &str = "340282366920938463463374607431768211456";

    #[test]
    fn two_pow_128_is_rejected() {
        let err = TWO_POW_128.parse::<Uint128>().unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn max_value_round_trips_through_limbs() {
        let max: Uint128 = "340282366920938463463374607431768211455".parse().unwrap();
        assert_eq!(max, Uint128::MAX);
        assert_eq!(max.lower(), u64::MAX);
        assert_eq!(max.upper(), u64::MAX);
        assert_eq!(Uint128::from_limbs(max.lower(), max.upper()), max);
        assert_eq!(max.to_u128(), u128::MAX);
    }

    #[test]
    fn hex_and_decimal_agree() {
        let dec: Uint128 = "18446744073709551616".parse().unwrap();
        let hex: Uint128 = "0x10000000000000000".parse().unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec.lower(), 0);
        assert_eq!(dec.upper(), 1);
    }

    #[test]
    fn negative_and_garbage_fail() {
        assert!("-1".parse::<Uint128>().unwrap_err().is_overflow());
        assert!(Uint128::try_from(-5i64).is_err());
        assert_eq!(
            "12abc".parse::<Uint128>().unwrap_err(),
            TypeError::InvalidInteger("12abc".to_string())
        );
    }

    #[test]
    fn ordering_uses_upper_limb_first() {
        let big = Uint128::from_limbs(0, 1);
        let small = Uint128::from_limbs(u64::MAX, 0);
        assert!(big > small);
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(Uint128::MAX.checked_add(Uint128::from(1u64)), None);
        assert_eq!(Uint128::ZERO.checked_sub(Uint128::from(1u64)), None);
        assert_eq!(
            Uint128::from(10u64).saturating_sub(Uint128::from(20u64)),
            Uint128::ZERO
        );
    }

    #[test]
    fn json_uses_number_below_two_pow_64() {
        let small = Uint128::from(42u64);
        assert_eq!(serde_json::to_string(&small).unwrap(), "42");

        let big = Uint128::from_limbs(0, 1);
        assert_eq!(
            serde_json::to_string(&big).unwrap(),
            "\"18446744073709551616\""
        );

        let back: Uint128 = serde_json::from_str("\"18446744073709551616\"").unwrap();
        assert_eq!(back, big);
        let back: Uint128 = serde_json::from_str("\"0xff\"").unwrap();
        assert_eq!(back, Uint128::from(255u64));
    }

    #[test]
    fn json_rejects_fractions_and_negatives() {
        assert!(serde_json::from_str::<Uint128>("1.5").is_err());
        assert!(serde_json::from_str::<Uint128>("-3").is_err());
    }
}
