use std::{collections::HashSet, path::Path, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::{
    alert::Targets,
    error::ConfigError,
    instrument::{FxPair, Instrument, InstrumentKind},
    portfolio::Holdings,
};

const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Everything a cycle needs besides live prices. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub home_currency: String,
    /// Amount added to every valuation, already in the home currency
    pub base_amount: Decimal,
    pub period: Duration,
    pub fx: FxPair,
    pub instruments: Vec<Instrument>,
    pub holdings: Holdings,
    pub targets: Targets,
}

impl Config {
    /// Compiled-in portfolio.
    pub fn builtin() -> Result<Self, ConfigError> {
        ConfigBuilder::default().build()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigBuilder {
    pub home_currency: String,
    pub base_amount: Decimal,
    #[serde(
        rename = "interval_secs",
        default = "default_period",
        deserialize_with = "deserialize_secs"
    )]
    pub period: Duration,
    pub fx: FxPair,
    pub instruments: Vec<Instrument>,
    pub holdings: Holdings,
    #[serde(default)]
    pub targets: Targets,
}

fn default_period() -> Duration {
    DEFAULT_PERIOD
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Duration::from_secs(u64::deserialize(deserializer)?))
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            home_currency: "JPY".to_string(),
            base_amount: dec!(1000000),
            period: DEFAULT_PERIOD,
            fx: FxPair::new("JPY=X", "USD", "JPY"),
            instruments: vec![
                Instrument::new("VOO", "VOO", InstrumentKind::Equity, "USD", dec!(1)),
                Instrument::new(
                    "GOLD",
                    "GC=F",
                    InstrumentKind::Future,
                    "USD",
                    dec!(31.1034768),
                ),
            ],
            holdings: Holdings::from_iter([("VOO", dec!(25)), ("GOLD", dec!(100))]),
            targets: Targets::from_iter([("VOO", dec!(90000)), ("GOLD", dec!(20000))]),
        }
    }
}

impl ConfigBuilder {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let file =
            std::fs::File::open(path).with_context(|| format!("Failed to open file {path:?}"))?;
        let builder: ConfigBuilder = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse config {path:?}"))?;
        debug!(?builder, "loaded config");
        Ok(builder)
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.fx.quote != self.home_currency {
            return Err(ConfigError::PairMismatch {
                pair: self.fx.to_string(),
                home: self.home_currency.clone(),
            });
        }

        let mut assets = HashSet::new();
        for instrument in self.instruments.iter() {
            if !assets.insert(instrument.asset.as_str()) {
                return Err(ConfigError::DuplicateAsset(instrument.asset.clone()));
            }
            if instrument.units_per_quote <= Decimal::ZERO {
                return Err(ConfigError::InvalidUnits(instrument.asset.clone()));
            }
            if instrument.currency != self.home_currency && instrument.currency != self.fx.base {
                return Err(ConfigError::UnconvertibleCurrency {
                    asset: instrument.asset.clone(),
                    currency: instrument.currency.clone(),
                    home: self.home_currency.clone(),
                    fx_base: self.fx.base.clone(),
                });
            }
        }

        let checks = self
            .holdings
            .iter()
            .map(|entry| ("quantity", entry))
            .chain(self.targets.iter().map(|entry| ("target", entry)));
        for (what, (asset, value)) in checks {
            if !assets.contains(asset.as_str()) {
                return Err(ConfigError::UnknownAsset(asset.clone()));
            }
            if *value < Decimal::ZERO {
                return Err(ConfigError::Negative {
                    what,
                    asset: asset.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        self.try_into()
    }
}

impl TryFrom<ConfigBuilder> for Config {
    type Error = ConfigError;

    fn try_from(builder: ConfigBuilder) -> Result<Self, Self::Error> {
        builder.validate()?;
        Ok(Config {
            home_currency: builder.home_currency,
            base_amount: builder.base_amount,
            period: builder.period,
            fx: builder.fx,
            instruments: builder.instruments,
            holdings: builder.holdings,
            targets: builder.targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_is_valid() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.period, Duration::from_secs(60));
        assert!(config
            .instruments
            .iter()
            .any(|instrument| instrument.asset == "GOLD" && instrument.symbol == "GC=F"));
        assert_eq!(config.holdings.len(), 2);
    }

    #[test]
    fn test_from_json() {
        let builder: ConfigBuilder = serde_json::from_value(json!({
            "home_currency": "EUR",
            "base_amount": "50.00",
            "interval_secs": 5,
            "fx": { "symbol": "EUR=X", "base": "USD", "quote": "EUR" },
            "instruments": [
                { "asset": "A", "symbol": "AAA", "kind": "equity", "currency": "USD", "units_per_quote": "1" }
            ],
            "holdings": { "A": "10" }
        }))
        .unwrap();
        let config = builder.build().unwrap();
        assert_eq!(config.period, Duration::from_secs(5));
        assert_eq!(config.base_amount, dec!(50));
        assert_eq!(config.holdings.get("A"), Some(dec!(10)));
        assert_eq!(config.targets, Targets::default());
    }

    #[test]
    fn test_rejects_unknown_asset() {
        let mut builder = ConfigBuilder::default();
        builder.targets = Targets::from_iter([("BTC", dec!(1))]);
        assert_eq!(
            builder.build(),
            Err(ConfigError::UnknownAsset("BTC".to_string()))
        );

        let mut builder = ConfigBuilder::default();
        builder.holdings = Holdings::from_iter([("BTC", dec!(1))]);
        assert_eq!(
            builder.build(),
            Err(ConfigError::UnknownAsset("BTC".to_string()))
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut builder = ConfigBuilder::default();
        builder.holdings = Holdings::from_iter([("VOO", dec!(-1))]);
        assert!(matches!(
            builder.build(),
            Err(ConfigError::Negative { what: "quantity", .. })
        ));

        let mut builder = ConfigBuilder::default();
        builder.instruments[1].units_per_quote = dec!(0);
        assert_eq!(
            builder.build(),
            Err(ConfigError::InvalidUnits("GOLD".to_string()))
        );

        let mut builder = ConfigBuilder::default();
        builder.instruments[0].currency = "GBP".to_string();
        assert!(matches!(
            builder.build(),
            Err(ConfigError::UnconvertibleCurrency { .. })
        ));

        let mut builder = ConfigBuilder::default();
        let duplicate = builder.instruments[0].clone();
        builder.instruments.push(duplicate);
        assert_eq!(
            builder.build(),
            Err(ConfigError::DuplicateAsset("VOO".to_string()))
        );

        let builder = ConfigBuilder::default().with_period(Duration::ZERO);
        assert_eq!(builder.build(), Err(ConfigError::ZeroPeriod));

        let mut builder = ConfigBuilder::default();
        builder.home_currency = "USD".to_string();
        assert!(matches!(
            builder.build(),
            Err(ConfigError::PairMismatch { .. })
        ));
    }
}
