//! # Money Amounts
//!
//! All money in the stack is held as integer minor units (kobo, 1/100 of a
//! naira) in an `i64`. Floating point never touches a stored amount: JSON
//! numbers are accepted on input but are re-parsed through their decimal
//! text, and amounts always serialize as two-decimal strings (`"1500.50"`).
//!
//! [`Amount`] is non-negative. [`SignedAmount`] is used for balances, which
//! go negative when expenses exceed income.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Display symbol for the single supported currency (Nigerian naira).
pub const CURRENCY_SYMBOL: &str = "₦";

/// ISO 4217 code for the single supported currency.
pub const CURRENCY_CODE: &str = "NGN";

/// Minor units per major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// A non-negative money amount in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Parse a decimal string such as `"1500"`, `"1500.5"` or `"1500.50"`.
    ///
    /// Leading/trailing whitespace is ignored. Signs, exponents, thousands
    /// separators and more than two fractional digits are rejected.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let invalid = || ValidationError::InvalidAmount(s.to_string());

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let overflow = || ValidationError::AmountOverflow(s.to_string());
        let whole: i64 = whole.parse().map_err(|_| overflow())?;
        let frac_minor: i64 = match frac.len() {
            0 => 0,
            1 => i64::from(frac.as_bytes()[0] - b'0') * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|v| v.checked_add(frac_minor))
            .map(Amount)
            .ok_or_else(overflow)
    }

    /// Construct from minor units. Negative values are rejected.
    pub fn from_minor(minor: i64) -> Result<Self, ValidationError> {
        if minor < 0 {
            return Err(ValidationError::InvalidAmount(format_minor(minor)));
        }
        Ok(Amount(minor))
    }

    /// Construct from whole major units (naira).
    pub fn from_major(major: u32) -> Self {
        Amount(i64::from(major) * MINOR_PER_MAJOR)
    }

    /// The amount in minor units.
    pub fn minor(self) -> i64 {
        self.0
    }

    /// True for the zero amount.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction; `None` if the result would be negative.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0
            .checked_sub(other.0)
            .filter(|v| *v >= 0)
            .map(Amount)
    }

    /// Plain two-decimal rendering without symbol or grouping (`"1500.50"`).
    /// This is the wire format.
    pub fn to_decimal_string(self) -> String {
        format_minor(self.0)
    }
}

impl fmt::Display for Amount {
    /// Human rendering with currency symbol and thousands grouping
    /// (`₦1,500.50`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{}", group_thousands(self.0))
    }
}

impl std::str::FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Amount::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Amount::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom(ValidationError::InvalidAmount(v.to_string())));
        }
        // f64 Display yields the shortest round-trip decimal, so 12.5 becomes
        // "12.5" and 12.345 stays "12.345" (and is rejected).
        Amount::parse(&v.to_string()).map_err(E::custom)
    }
}

/// A money value that may be negative, used for balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedAmount(i64);

impl SignedAmount {
    /// The zero balance.
    pub const ZERO: SignedAmount = SignedAmount(0);

    /// Construct from signed minor units.
    pub fn from_minor(minor: i64) -> Self {
        SignedAmount(minor)
    }

    /// `credit - debit`, saturating at the `i64` bounds.
    pub fn difference(credit: Amount, debit: Amount) -> Self {
        SignedAmount(credit.0.saturating_sub(debit.0))
    }

    /// The value in signed minor units.
    pub fn minor(self) -> i64 {
        self.0
    }

    /// True when the value is below zero.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Two-decimal wire rendering (`"-250.00"`).
    pub fn to_decimal_string(self) -> String {
        format_minor(self.0)
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{CURRENCY_SYMBOL}{}", group_thousands(self.0))
    }
}

impl Serialize for SignedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for SignedAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        let (negative, magnitude) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let amount = Amount::parse(magnitude).map_err(de::Error::custom)?;
        Ok(SignedAmount(if negative { -amount.0 } else { amount.0 }))
    }
}

/// Render signed minor units as `[-]major.minor` with exactly two decimals.
pub fn format_minor(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let per = MINOR_PER_MAJOR as u64;
    format!("{}{}.{:02}", sign, abs / per, abs % per)
}

fn group_thousands(minor: i64) -> String {
    let abs = minor.unsigned_abs();
    let per = MINOR_PER_MAJOR as u64;
    let digits = (abs / per).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}.{:02}", grouped, abs % per)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(Amount::parse("1500").unwrap().minor(), 150_000);
        assert_eq!(Amount::parse("1500.5").unwrap().minor(), 150_050);
        assert_eq!(Amount::parse("1500.50").unwrap().minor(), 150_050);
        assert_eq!(Amount::parse("0.01").unwrap().minor(), 1);
        assert_eq!(Amount::parse(" 42 ").unwrap().minor(), 4_200);
        assert_eq!(Amount::parse("7.").unwrap().minor(), 700);
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "  ", "-5", "+5", "1.234", "abc", "1,000", ".5", "1e3", "1.2.3"] {
            assert!(Amount::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        let err = Amount::parse("99999999999999999999").unwrap_err();
        assert!(matches!(err, ValidationError::AmountOverflow(_)));
        let err = Amount::parse("92233720368547758.08").unwrap_err();
        assert!(matches!(err, ValidationError::AmountOverflow(_)));
    }

    #[test]
    fn from_minor_rejects_negative() {
        assert!(Amount::from_minor(-1).is_err());
        assert_eq!(Amount::from_minor(0).unwrap(), Amount::ZERO);
    }

    #[test]
    fn display_groups_thousands_with_symbol() {
        assert_eq!(Amount::parse("1234567.8").unwrap().to_string(), "₦1,234,567.80");
        assert_eq!(Amount::parse("999").unwrap().to_string(), "₦999.00");
        assert_eq!(Amount::ZERO.to_string(), "₦0.00");
    }

    #[test]
    fn signed_display_and_wire() {
        let bal = SignedAmount::difference(Amount::from_major(100), Amount::from_major(1_250));
        assert!(bal.is_negative());
        assert_eq!(bal.to_decimal_string(), "-1150.00");
        assert_eq!(bal.to_string(), "-₦1,150.00");
    }

    #[test]
    fn serde_accepts_strings_and_numbers() {
        let a: Amount = serde_json::from_str("\"250.75\"").unwrap();
        assert_eq!(a.minor(), 25_075);
        let b: Amount = serde_json::from_str("250").unwrap();
        assert_eq!(b.minor(), 25_000);
        let c: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(c.minor(), 1_250);
        assert!(serde_json::from_str::<Amount>("-3").is_err());
        assert!(serde_json::from_str::<Amount>("1.005").is_err());
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"12.50\"");
    }

    #[test]
    fn signed_serde_handles_negative_strings() {
        let v: SignedAmount = serde_json::from_str("\"-40.10\"").unwrap();
        assert_eq!(v.minor(), -4_010);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"-40.10\"");
    }

    #[test]
    fn checked_sub_refuses_negative_result() {
        let small = Amount::from_major(1);
        let big = Amount::from_major(2);
        assert_eq!(big.checked_sub(small), Some(small));
        assert_eq!(small.checked_sub(big), None);
        assert_eq!(Amount::from_minor(i64::MAX).unwrap().checked_add(small), None);
    }

    proptest! {
        #[test]
        fn formatted_amounts_parse_back(minor in 0i64..=i64::MAX) {
            let amount = Amount::from_minor(minor).unwrap();
            prop_assert_eq!(Amount::parse(&amount.to_decimal_string()).unwrap(), amount);
        }

        #[test]
        fn parse_never_panics(s in "\\PC{0,24}") {
            let _ = Amount::parse(&s);
        }

        #[test]
        fn difference_matches_integer_math(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000) {
            let diff = SignedAmount::difference(
                Amount::from_minor(a).unwrap(),
                Amount::from_minor(b).unwrap(),
            );
            prop_assert_eq!(diff.minor(), a - b);
        }
    }
}
