use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum_macros::{Display as StrumDisplay, EnumString};

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InstrumentKind {
    Equity,
    Future,
    Currency,
}

/// A tracked instrument as the upstream provider quotes it.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct Instrument {
    /// Identifier used by holdings and targets
    pub asset: String,
    /// Provider symbol, e.g. `GC=F`
    pub symbol: String,
    pub kind: InstrumentKind,
    /// Currency the provider quotes the instrument in
    pub currency: String,
    /// Holding units contained in one quoted unit (31.1034768 grams per troy ounce)
    #[serde(with = "rust_decimal::serde::str")]
    pub units_per_quote: Decimal,
}

impl Instrument {
    pub fn new(
        asset: &str,
        symbol: &str,
        kind: InstrumentKind,
        currency: &str,
        units_per_quote: Decimal,
    ) -> Self {
        Self {
            asset: asset.to_string(),
            symbol: symbol.to_string(),
            kind,
            currency: currency.to_string(),
            units_per_quote,
        }
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.asset, self.kind, self.symbol)
    }
}

/// Currency pair whose latest close is the `base` -> `quote` conversion rate.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FxPair {
    pub symbol: String,
    pub base: String,
    pub quote: String,
}

impl FxPair {
    pub fn new(symbol: &str, base: &str, quote: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            base: base.to_string(),
            quote: quote.to_string(),
        }
    }
}

impl TryFrom<&str> for FxPair {
    type Error = String;

    /// Parses a six letter pair such as `USDJPY` into a Yahoo style `JPY=X` pair.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.len() {
            6 if value.chars().all(|c| c.is_ascii_alphabetic()) => {
                let base = value[0..=2].to_uppercase();
                let quote = value[3..=5].to_uppercase();
                let symbol = if base == "USD" {
                    format!("{quote}=X")
                } else {
                    format!("{base}{quote}=X")
                };
                Ok(Self {
                    symbol,
                    base,
                    quote,
                })
            }
            _ => Err(format!("Could not convert {} to currency pair", value)),
        }
    }
}

impl Display for FxPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
