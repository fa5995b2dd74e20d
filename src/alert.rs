use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

use crate::{quote::PriceQuote, utils::RoundedDisplay};

/// Alert thresholds per asset, in the home currency.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Targets(BTreeMap<String, Decimal>);

impl Targets {
    pub fn get(&self, asset: &str) -> Option<Decimal> {
        self.0.get(asset).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for Targets {
    fn from_iter<T: IntoIterator<Item = (S, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub asset: String,
    pub price: Decimal,
    pub target: Decimal,
}

impl Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} reached {} (target {})",
            self.asset,
            self.price.to_string_rounded(),
            self.target.to_string_rounded()
        )
    }
}

/// Every asset whose live price is at or above its target.
///
/// Holds no state between calls, so a breach fires again on every cycle it persists.
/// Targets without a quoted price are skipped.
pub fn evaluate(targets: &Targets, quote: &PriceQuote) -> Vec<Alert> {
    targets
        .iter()
        .filter_map(|(asset, &target)| {
            let price = quote.price(asset)?;
            (price >= target).then(|| Alert {
                asset: asset.clone(),
                price,
                target,
            })
        })
        .collect()
}
