use thiserror::Error;

/// Anything that prevents a complete quote for the cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status} for {symbol}")]
    Status { symbol: String, status: u16 },
    #[error("undecodable response for {symbol}: {reason}")]
    Decode { symbol: String, reason: String },
    #[error("provider returned an error for {symbol}: {description}")]
    Provider { symbol: String, description: String },
    #[error("missing field `{field}` for {symbol}")]
    MissingField { symbol: String, field: &'static str },
    #[error("no recent close for {0}")]
    EmptySeries(String),
    #[error("latest close for {symbol} is {age_secs}s old")]
    Stale { symbol: String, age_secs: i64 },
    #[error("no quote for {0}")]
    MissingSymbol(String),
    #[error("invalid price for {symbol}: {reason}")]
    InvalidPrice { symbol: String, reason: String },
    #[error("provider unavailable")]
    Unavailable,
    #[error("replay exhausted after {0} frames")]
    ReplayExhausted(usize),
}

impl FetchError {
    /// Transport failures as opposed to payloads that do not have the expected shape.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Status { .. } | FetchError::Unavailable
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no instrument for asset {0}")]
    UnknownAsset(String),
    #[error("duplicate instrument for asset {0}")]
    DuplicateAsset(String),
    #[error("negative {what} for asset {asset}")]
    Negative { what: &'static str, asset: String },
    #[error("units per quote must be positive for asset {0}")]
    InvalidUnits(String),
    #[error("currency {currency} of asset {asset} is neither {home} nor {fx_base}")]
    UnconvertibleCurrency {
        asset: String,
        currency: String,
        home: String,
        fx_base: String,
    },
    #[error("currency pair {pair} does not convert into {home}")]
    PairMismatch { pair: String, home: String },
    #[error("cycle period must be at least one second")]
    ZeroPeriod,
}
