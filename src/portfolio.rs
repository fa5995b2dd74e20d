use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quote::PriceQuote;

/// Quantity owned per asset, fixed once the config is built.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Holdings(BTreeMap<String, Decimal>);

impl Holdings {
    pub fn get(&self, asset: &str) -> Option<Decimal> {
        self.0.get(asset).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for Holdings {
    fn from_iter<T: IntoIterator<Item = (S, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetValue {
    pub asset: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub value: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioValuation {
    pub base: Decimal,
    pub assets: Vec<AssetValue>,
    pub total: Decimal,
}

/// Values every holding at the quoted price and adds the base amount.
///
/// Returns `None` when the quote lacks a price for one of the holdings or a
/// value does not fit in a `Decimal`.
pub fn valuate(
    holdings: &Holdings,
    quote: &PriceQuote,
    base: Decimal,
) -> Option<PortfolioValuation> {
    let assets = holdings
        .iter()
        .map(|(asset, &amount)| {
            let price = quote.price(asset)?;
            Some(AssetValue {
                asset: asset.clone(),
                amount,
                price,
                value: amount.checked_mul(price)?,
            })
        })
        .collect::<Option<Vec<AssetValue>>>()?;

    let total = assets
        .iter()
        .try_fold(base, |acc, asset| acc.checked_add(asset.value))?;

    Some(PortfolioValuation {
        base,
        assets,
        total,
    })
}
