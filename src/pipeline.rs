use tracing::{debug, trace};

use crate::{
    alert::{self, Alert},
    config::Config,
    error::FetchError,
    fetcher::PriceFetcher,
    portfolio::{self, PortfolioValuation},
    provider::QuoteProvider,
    quote::PriceQuote,
    report::Reporter,
};

#[derive(Debug)]
pub enum CycleOutcome {
    /// No complete quote this cycle, nothing was reported
    Skipped(FetchError),
    Completed {
        quote: PriceQuote,
        valuation: PortfolioValuation,
        alerts: Vec<Alert>,
    },
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed { .. })
    }
}

/// Fetch, valuate, evaluate targets and report, once.
pub async fn run_cycle<P: QuoteProvider, R: Reporter>(
    config: &Config,
    fetcher: &PriceFetcher<P>,
    reporter: &mut R,
) -> CycleOutcome {
    let quote = match fetcher.fetch(config).await {
        Ok(quote) => quote,
        Err(err) => {
            debug!(network = err.is_network(), "Skipping cycle : {err}");
            return CycleOutcome::Skipped(err);
        }
    };

    let Some(valuation) = portfolio::valuate(&config.holdings, &quote, config.base_amount) else {
        let missing = config
            .holdings
            .iter()
            .map(|(asset, _)| asset)
            .find(|asset| quote.price(asset).is_none())
            .cloned();
        let err = match missing {
            Some(asset) => FetchError::MissingSymbol(asset),
            None => FetchError::InvalidPrice {
                symbol: "portfolio".to_string(),
                reason: "overflow".to_string(),
            },
        };
        debug!("Skipping cycle : {err}");
        return CycleOutcome::Skipped(err);
    };

    let alerts = alert::evaluate(&config.targets, &quote);
    for alert in alerts.iter() {
        reporter.alert(alert);
    }
    reporter.summary(config, &valuation, &quote);
    trace!(total = %valuation.total, alerts = alerts.len(), "cycle completed");

    CycleOutcome::Completed {
        quote,
        valuation,
        alerts,
    }
}
