use std::io::{Stdout, Write};

use colored::Colorize;
use tracing::error;

use crate::{
    alert::Alert, config::Config, portfolio::PortfolioValuation, quote::PriceQuote,
    utils::RoundedDisplay,
};

const ALERT_MARKER: &str = "!!!!!!!!!!";
const BELL: &str = "\x07";
const BELL_REPEAT: usize = 3;
const RATE_DP: u32 = 4;

/// Where the scheduler sends everything the user sees.
pub trait Reporter {
    fn banner(&mut self, config: &Config);
    fn alert(&mut self, alert: &Alert);
    fn summary(&mut self, config: &Config, valuation: &PortfolioValuation, quote: &PriceQuote);
    fn stopped(&mut self);
}

/// `[2026-10-14 09:30:00] total 2500000.00 JPY | GOLD 1200000.00 | VOO 300000.00 | USD/JPY 150.0250`
pub fn summary_line(config: &Config, valuation: &PortfolioValuation, quote: &PriceQuote) -> String {
    let mut parts = vec![format!(
        "[{}] total {} {}",
        quote.observed_at.format("%Y-%m-%d %H:%M:%S"),
        valuation.total.to_string_rounded(),
        config.home_currency
    )];
    parts.extend(
        valuation
            .assets
            .iter()
            .map(|asset| format!("{} {}", asset.asset, asset.value.to_string_rounded())),
    );
    parts.push(format!(
        "{} {:.prec$}",
        config.fx,
        quote.fx_rate.round_dp(RATE_DP),
        prec = RATE_DP as usize
    ));
    parts.join(" | ")
}

/// Writes straight to the terminal, flushing after every message.
#[derive(Debug)]
pub struct ConsoleReporter<W = Stdout> {
    out: W,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            error!("Failed to write report : {err}");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn banner(&mut self, config: &Config) {
        let mut text = format!(
            "{} every {}s, valuing in {} (base {})\n",
            "pricewatch".bold(),
            config.period.as_secs(),
            config.home_currency,
            config.base_amount.to_string_rounded()
        );
        for instrument in config.instruments.iter() {
            let holding = config
                .holdings
                .get(&instrument.asset)
                .map(|amount| format!("holding {amount}"))
                .unwrap_or_else(|| "not held".to_string());
            let target = config
                .targets
                .get(&instrument.asset)
                .map(|target| format!(", alert at {}", target.to_string_rounded()))
                .unwrap_or_default();
            text.push_str(&format!(" - {instrument}: {holding}{target}\n"));
        }
        text.push_str(&format!(" - {} via {}\n", config.fx, config.fx.symbol));
        self.emit(&text);
    }

    fn alert(&mut self, alert: &Alert) {
        let text = format!(
            "{}\n{} {}\n{}\n{}",
            ALERT_MARKER.red().bold(),
            "ALERT".red().bold(),
            alert,
            ALERT_MARKER.red().bold(),
            BELL.repeat(BELL_REPEAT)
        );
        self.emit(&text);
    }

    fn summary(&mut self, config: &Config, valuation: &PortfolioValuation, quote: &PriceQuote) {
        let line = summary_line(config, valuation, quote);
        self.emit(&format!("{line}\n"));
    }

    fn stopped(&mut self) {
        self.emit(&format!("{}\n", "pricewatch stopped".bold()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{instrument::FxPair, portfolio::valuate};
    use chrono::{Local, TimeZone};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn fixture() -> (Config, PortfolioValuation, PriceQuote) {
        let config = Config::builtin().unwrap();
        let quote = PriceQuote::new(
            HashMap::from([
                ("VOO".to_string(), dec!(75000)),
                ("GOLD".to_string(), dec!(12000.123)),
            ]),
            dec!(150),
            Local.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap(),
        );
        let valuation = valuate(&config.holdings, &quote, config.base_amount).unwrap();
        (config, valuation, quote)
    }

    #[test]
    fn test_summary_line() {
        let (config, valuation, quote) = fixture();
        assert_eq!(
            summary_line(&config, &valuation, &quote),
            "[2026-10-14 09:30:00] total 4075012.30 JPY | GOLD 1200012.30 | VOO 1875000.00 | USD/JPY 150.0000"
        );
    }

    #[test]
    fn test_summary_line_keeps_rate_precision() {
        let (mut config, valuation, mut quote) = fixture();
        config.fx = FxPair::new("EUR=X", "USD", "EUR");
        quote.fx_rate = dec!(0.923456);
        assert!(summary_line(&config, &valuation, &quote).ends_with(" | USD/EUR 0.9235"));
    }

    #[test]
    fn test_console_alert_rings_bell() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.alert(&Alert {
            asset: "GOLD".to_string(),
            price: dec!(900),
            target: dec!(850),
        });
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(out.contains("GOLD reached 900.00 (target 850.00)"));
        assert!(out.contains(ALERT_MARKER));
        assert!(out.ends_with(&BELL.repeat(BELL_REPEAT)));
    }

    #[test]
    fn test_console_banner() {
        let (config, _, _) = fixture();
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.banner(&config);
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(out.contains("GOLD (future GC=F): holding 100, alert at 20000.00"));
        assert!(out.contains("USD/JPY via JPY=X"));
    }
}
