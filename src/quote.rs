use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Latest prices of one cycle, already in the home currency and holding unit.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    prices: HashMap<String, Decimal>,
    /// Rate used to convert foreign quotes into the home currency
    pub fx_rate: Decimal,
    pub observed_at: DateTime<Local>,
}

impl PriceQuote {
    pub fn new(
        prices: HashMap<String, Decimal>,
        fx_rate: Decimal,
        observed_at: DateTime<Local>,
    ) -> Self {
        Self {
            prices,
            fx_rate,
            observed_at,
        }
    }

    pub fn price(&self, asset: &str) -> Option<Decimal> {
        self.prices.get(asset).copied()
    }
}
