use chrono::Local;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    config::Config, error::FetchError, instrument::Instrument, provider::QuoteProvider,
    quote::PriceQuote,
};

/// Turns one provider call into a complete quote in the home currency.
#[derive(Debug)]
pub struct PriceFetcher<P> {
    provider: P,
}

impl<P: QuoteProvider> PriceFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, config: &Config) -> Result<PriceQuote, FetchError> {
        let fx = &config.fx;
        let mut symbols: Vec<&str> = config
            .instruments
            .iter()
            .map(|instrument| instrument.symbol.as_str())
            .collect();
        symbols.push(fx.symbol.as_str());

        let closes = self.provider.latest_closes(&symbols).await?;
        debug!(?closes, "latest closes");

        let fx_rate = close_of(&closes, &fx.symbol)?;
        if fx_rate <= Decimal::ZERO {
            return Err(FetchError::InvalidPrice {
                symbol: fx.symbol.clone(),
                reason: format!("conversion rate {fx_rate} is not positive"),
            });
        }

        let prices = config
            .instruments
            .iter()
            .map(|instrument| -> Result<(String, Decimal), FetchError> {
                let close = close_of(&closes, &instrument.symbol)?;
                let rate = if instrument.currency == config.home_currency {
                    Decimal::ONE
                } else {
                    fx_rate
                };
                Ok((instrument.asset.clone(), normalize(instrument, close, rate)?))
            })
            .collect::<Result<HashMap<String, Decimal>, FetchError>>()?;

        Ok(PriceQuote::new(prices, fx_rate, Local::now()))
    }
}

fn close_of(closes: &HashMap<String, Decimal>, symbol: &str) -> Result<Decimal, FetchError> {
    closes
        .get(symbol)
        .copied()
        .ok_or_else(|| FetchError::MissingSymbol(symbol.to_string()))
}

/// Price of one holding unit in the home currency.
fn normalize(instrument: &Instrument, close: Decimal, rate: Decimal) -> Result<Decimal, FetchError> {
    close
        .checked_div(instrument.units_per_quote)
        .and_then(|unit_price| unit_price.checked_mul(rate))
        .ok_or_else(|| FetchError::InvalidPrice {
            symbol: instrument.symbol.clone(),
            reason: "overflow".to_string(),
        })
}
