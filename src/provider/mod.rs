use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::FetchError;

pub mod replay;
pub mod yahoo;

pub use replay::ReplayProvider;
pub use yahoo::YahooProvider;

/// Upstream source of the latest closing observation per provider symbol.
pub trait QuoteProvider {
    /// One fetch for the whole symbol list. Either every requested symbol is
    /// present in the result or an error is returned.
    async fn latest_closes(&self, symbols: &[&str]) -> Result<HashMap<String, Decimal>, FetchError>;
}
