//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    120.48 × 10 / 100 = 12.048000000000002  ❌ WRONG!                    │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimals                                           │
//! │    120.48 × 10 / 100 = 12.048              ✅ exact                     │
//! │    Rounded to minor units only when a figure is settled or shown       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nexus_core::money::{Money, Percent};
//!
//! let price = Money::from_cents(4599);          // 45.99
//! let line = price.multiply_quantity(2);         // 91.98
//! let discount = line.percent_of(Percent::from_whole(10)); // 9.198
//! assert_eq!(discount.rounded().cents(), 920);
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of minor units (decimal places) money is settled at.
pub const MINOR_UNITS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value as an exact decimal.
///
/// ## Design Decisions
/// - **Decimal, not f64**: percentages of prices stay exact (12.048, not 12.048000000000002)
/// - **No implicit rounding**: arithmetic keeps full precision; call [`Money::rounded`]
///   to settle at two decimal places with banker's rounding
/// - **JSON numbers on the wire**: the REST API speaks plain numbers
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► LineItem.unit_price ──► LineItem.total_price
///                                                  │
///                                                  ▼
///                         subtotal ──► discount ──► taxable ──► tax ──► total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money value from an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use nexus_core::money::Money;
    ///
    /// let price = Money::from_cents(2850); // 28.50
    /// assert_eq!(price.to_string(), "28.50");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MINOR_UNITS))
    }

    /// Creates a Money value from a whole number of major units.
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount in minor units, after rounding to two decimal places.
    ///
    /// ## Example
    /// ```rust
    /// use nexus_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let tax = Money::new(Decimal::new(54216, 4)); // 5.4216
    /// assert_eq!(tax.cents(), 542);
    /// ```
    pub fn cents(&self) -> i64 {
        let mut settled = self.rounded().0;
        settled.rescale(MINOR_UNITS);
        i64::try_from(settled.mantissa()).unwrap_or(if settled.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use nexus_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(4599); // 45.99
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 9198); // 91.98
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `percent` of this amount, exactly.
    ///
    /// ## Example
    /// ```rust
    /// use nexus_core::money::{Money, Percent};
    /// use rust_decimal::Decimal;
    ///
    /// let subtotal = Money::from_cents(12048); // 120.48
    /// let discount = subtotal.percent_of(Percent::from_whole(10));
    /// assert_eq!(discount.amount(), Decimal::new(12048, 3)); // 12.048
    /// ```
    pub fn percent_of(&self, percent: Percent) -> Money {
        Money(self.0 * percent.value() / Decimal::ONE_HUNDRED)
    }

    /// Rounds to two decimal places using banker's rounding (round half to even).
    ///
    /// ```text
    /// 0.125 → 0.12    0.135 → 0.14    5.4216 → 5.42    12.048 → 12.05
    /// ```
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(MINOR_UNITS, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Formats the rounded amount followed by a currency code, e.g. `"120.48 LKR"`.
    pub fn format_with(&self, currency: &str) -> String {
        format!("{} {}", self, currency)
    }
}

/// Shows the amount rounded to two decimal places.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut settled = self.rounded().0;
        settled.rescale(MINOR_UNITS);
        write!(f, "{}", settled)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: e.to_string(),
            })
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        decimal_number::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decimal_number::deserialize(deserializer).map(Money)
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage in the closed range 0–100 (tax rate, bill discount).
///
/// ## Why a newtype?
/// The REST API stores plain numbers (`taxRate: 5`, `discount: 10`). Wrapping
/// them means a bill can never carry a 140% discount or a negative tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a percentage, rejecting values outside 0–100.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "percentage".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Percent(value.normalize()))
    }

    /// Creates a whole-number percentage, saturating at 100.
    pub fn from_whole(value: u32) -> Self {
        Percent(Decimal::from(value.min(100)))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Returns the percentage value (10 for 10%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// Parses `"8.25"` or `"8.25%"`.
impl FromStr for Percent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().trim_end_matches('%').trim();
        let value = Decimal::from_str(raw).map_err(|e| ValidationError::InvalidFormat {
            field: "percentage".to_string(),
            reason: e.to_string(),
        })?;
        Percent::new(value)
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        decimal_number::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = decimal_number::deserialize(deserializer)?;
        Percent::new(value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Decimals travel as plain JSON numbers.
///
/// Floats are parsed through their shortest round-trip text form, so `45.99`
/// on the wire becomes exactly `45.99` and not `45.9900000000000019895...`.
pub(crate) mod decimal_number {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        // Text first: the nearest f64 to the decimal, not an accumulated approximation.
        let text = value.normalize().to_string();
        match f64::from_str(&text).ok().or_else(|| value.to_f64()) {
            Some(number) if number.is_finite() => serializer.serialize_f64(number),
            _ => serializer.serialize_str(&text),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            if !v.is_finite() {
                return Err(E::custom("non-finite number"));
            }
            Decimal::from_str(&v.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            Decimal::from_str(v.trim()).map_err(E::custom)
        }
    }

    /// Same format for optional fields; JSON `null` reads as `None`.
    pub mod option {
        use rust_decimal::Decimal;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<Decimal>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Decimal>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapped(#[serde(with = "crate::money::decimal_number")] Decimal);

            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(v)| v))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(4599);
        assert_eq!(money.amount(), dec!(45.99));
        assert_eq!(money.cents(), 4599);
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        assert_eq!(Money::from_cents(12048).to_string(), "120.48");
        assert_eq!(Money::from_major(5).to_string(), "5.00");
        assert_eq!(Money::new(dec!(113.8536)).to_string(), "113.85");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(12048).format_with("LKR"), "120.48 LKR");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percent_of_is_exact() {
        let subtotal = Money::from_cents(12048);
        let discount = subtotal.percent_of(Percent::from_whole(10));
        assert_eq!(discount.amount(), dec!(12.048));

        let taxable = subtotal - discount;
        assert_eq!(taxable.amount(), dec!(108.432));

        let tax = taxable.percent_of(Percent::from_whole(5));
        assert_eq!(tax.amount(), dec!(5.4216));
    }

    #[test]
    fn test_bankers_rounding() {
        assert_eq!(Money::new(dec!(0.125)).rounded().amount(), dec!(0.12));
        assert_eq!(Money::new(dec!(0.135)).rounded().amount(), dec!(0.14));
        assert_eq!(Money::new(dec!(12.048)).cents(), 1205);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_percent_range() {
        assert!(Percent::new(dec!(0)).is_ok());
        assert!(Percent::new(dec!(100)).is_ok());
        assert!(Percent::new(dec!(8.25)).is_ok());
        assert!(Percent::new(dec!(-1)).is_err());
        assert!(Percent::new(dec!(100.01)).is_err());
        assert_eq!(Percent::from_whole(250).value(), dec!(100));
    }

    #[test]
    fn test_percent_parsing() {
        assert_eq!("8.25".parse::<Percent>().unwrap().value(), dec!(8.25));
        assert_eq!("10%".parse::<Percent>().unwrap().value(), dec!(10));
        assert!("abc".parse::<Percent>().is_err());
        assert!("150".parse::<Percent>().is_err());
        assert_eq!(Percent::from_whole(5).to_string(), "5%");
    }

    #[test]
    fn test_wire_format_reads_json_numbers_exactly() {
        let money: Money = serde_json::from_str("45.99").unwrap();
        assert_eq!(money.amount(), dec!(45.99));

        let whole: Money = serde_json::from_str("28").unwrap();
        assert_eq!(whole.amount(), dec!(28));

        let percent: Percent = serde_json::from_str("8.25").unwrap();
        assert_eq!(percent.value(), dec!(8.25));

        assert!(serde_json::from_str::<Percent>("120").is_err());
    }

    #[test]
    fn test_wire_format_writes_json_numbers() {
        let json = serde_json::to_string(&Money::new(dec!(113.8536))).unwrap();
        assert_eq!(json, "113.8536");
    }
}
