use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::NOT_AVAILABLE;

// ---------------------------------------------------------------------------
// Price: normalized amount or the "N/A" sentinel
// ---------------------------------------------------------------------------

/// A scraped price.
///
/// Serializes as a JSON number, or as the string `"N/A"` when the page did not
/// carry a price for the card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Amount(f64),
    Unavailable,
}

impl Price {
    /// The numeric amount, if any.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(v) => Some(*v),
            Price::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Price::Amount(_))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(v) => write!(f, "{v:.2}"),
            Price::Unavailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Amount(v) => serializer.serialize_f64(*v),
            Price::Unavailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or the string \"N/A\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        Ok(Price::Amount(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Ok(Price::Amount(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price::Amount(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        if v == NOT_AVAILABLE {
            return Ok(Price::Unavailable);
        }
        v.parse::<f64>()
            .map(Price::Amount)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Price, E> {
        Ok(Price::Unavailable)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}
