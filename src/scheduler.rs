use std::future::Future;

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::{
    config::Config,
    fetcher::PriceFetcher,
    pipeline::{run_cycle, CycleOutcome},
    provider::QuoteProvider,
    report::Reporter,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

/// Runs the pipeline once per period until shut down.
pub struct Scheduler<'a, P, R> {
    config: &'a Config,
    fetcher: PriceFetcher<P>,
    reporter: R,
    state: SchedulerState,
    cycles: u64,
}

impl<'a, P: QuoteProvider, R: Reporter> Scheduler<'a, P, R> {
    pub fn new(config: &'a Config, fetcher: PriceFetcher<P>, reporter: R) -> Self {
        Self {
            config,
            fetcher,
            reporter,
            state: SchedulerState::Running,
            cycles: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    pub async fn run_once(&mut self) -> CycleOutcome {
        self.cycles += 1;
        run_cycle(self.config, &self.fetcher, &mut self.reporter).await
    }

    /// Ticks immediately, then every `config.period`. `shutdown` is only
    /// polled while waiting for the next tick, so a running cycle always
    /// completes.
    pub async fn run<S: Future<Output = ()>>(&mut self, shutdown: S) {
        let mut ticker = interval(self.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        while self.state == SchedulerState::Running {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} cycles", self.cycles);
                    self.state = SchedulerState::Stopped;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
        self.reporter.stopped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{config, frame, RecordingReporter};
    use crate::provider::ReplayProvider;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_runs_one_cycle_per_period() {
        let config = config();
        let fetcher = PriceFetcher::new(ReplayProvider::from_frames(vec![
            frame(dec!(100)),
            None,
            frame(dec!(900)),
            frame(dec!(100)),
        ]));
        let mut scheduler = Scheduler::new(&config, fetcher, RecordingReporter::default());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        // ticks at 0s, 60s and 120s
        scheduler
            .run(tokio::time::sleep(Duration::from_secs(150)))
            .await;

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        let reporter = scheduler.into_reporter();
        assert_eq!(reporter.summaries, vec![dec!(1050), dec!(9050)]);
        assert_eq!(reporter.alerts.len(), 1);
        assert!(reporter.stopped);
    }

    #[tokio::test]
    async fn test_stops_before_first_cycle() {
        let config = config();
        let fetcher = PriceFetcher::new(ReplayProvider::from_frames(vec![frame(dec!(100))]));
        let mut scheduler = Scheduler::new(&config, fetcher, RecordingReporter::default());

        scheduler.run(std::future::ready(())).await;

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        let reporter = scheduler.into_reporter();
        assert!(reporter.summaries.is_empty());
        assert!(reporter.stopped);
    }
}
