//! Listing price using exact decimal arithmetic.
//!
//! Prices are kept at a fixed scale of two fractional digits so the stored
//! text, the rendered page, and the JSON API all show the same value.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is required")]
    Empty,
    #[error("price must be a number")]
    NotANumber,
    #[error("price must be greater than zero")]
    NotPositive,
    #[error("price can have at most two decimal places")]
    TooPrecise,
    #[error("price must be at most {max}")]
    TooLarge { max: Decimal },
}

/// A strictly positive price with two decimal places.
///
/// ```
/// use bazaar_core::Price;
///
/// let price = Price::parse("12.5").unwrap();
/// assert_eq!(price.to_string(), "12.50");
/// assert!(Price::parse("0").is_err());
/// assert!(Price::parse("1.999").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of fractional digits every price carries.
    pub const SCALE: u32 = 2;

    /// Largest accepted price.
    pub const MAX: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

    /// Parse a price typed into a form.
    ///
    /// A comma is accepted as the decimal separator.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the input is not a positive decimal with at
    /// most two fractional digits, or exceeds [`Self::MAX`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount = Decimal::from_str(&s.replace(',', ".")).map_err(|_| PriceError::NotANumber)?;
        Self::from_decimal(amount)
    }

    /// Validate an already-parsed decimal amount.
    ///
    /// # Errors
    ///
    /// Same constraints as [`Self::parse`].
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge { max: Self::MAX });
        }
        let mut amount = amount;
        amount.rescale(Self::SCALE);
        Ok(Self(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Sum a sequence of prices. An empty sequence totals zero.
    pub fn total<'a>(prices: impl IntoIterator<Item = &'a Self>) -> Decimal {
        let mut total: Decimal = prices.into_iter().map(|p| p.0).sum();
        total.rescale(Self::SCALE);
        total
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// Stored as TEXT: SQLite has no exact decimal type.
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> <sqlx::Sqlite as sqlx::Database>::TypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &<sqlx::Sqlite as sqlx::Database>::TypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode(self.0.to_string(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rescales_to_two_places() {
        assert_eq!(Price::parse("7").unwrap().to_string(), "7.00");
        assert_eq!(Price::parse("19.9").unwrap().to_string(), "19.90");
        assert_eq!(Price::parse(" 3,25 ").unwrap().to_string(), "3.25");
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        assert_eq!(Price::parse("1.500").unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("cheap"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("0"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse("-4"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse("0.001"), Err(PriceError::TooPrecise));
        assert!(matches!(
            Price::parse("1000000000.01"),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_total() {
        let prices = [Price::parse("1.10").unwrap(), Price::parse("2.35").unwrap()];
        assert_eq!(Price::total(&prices).to_string(), "3.45");
        assert_eq!(Price::total(&[]).to_string(), "0.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::parse("12.5").unwrap()).unwrap();
        assert_eq!(json, "\"12.50\"");
        let price: Price = serde_json::from_str("\"4.20\"").unwrap();
        assert_eq!(price, Price::parse("4.2").unwrap());
    }
}
