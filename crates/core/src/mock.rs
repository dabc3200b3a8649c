//! Simulated asynchronous data sources. A fetch runs on its own thread,
//! sleeps for the configured latency and then always delivers its result.

use std::thread::sleep;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use tracing::{debug, trace};

use crate::config::ChartConfig;

#[derive(Debug, Clone)]
pub enum LoadMsg {
    Loaded(Box<ChartConfig>),
}

/// Where a card is in its load cycle; each card owns one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
pub struct MockSource {
    latency: Duration,
}

impl MockSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Starts a fetch. Dropping the returned receiver abandons it; the worker
    /// notices the closed channel and exits quietly.
    pub fn fetch<F>(&self, name: &str, build: F) -> Receiver<LoadMsg>
    where
        F: FnOnce() -> ChartConfig + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let latency = self.latency;
        let name = name.to_string();
        debug!(%name, ?latency, "mock fetch started");
        std::thread::spawn(move || {
            sleep(latency);
            if tx.send(LoadMsg::Loaded(Box::new(build()))).is_err() {
                trace!(%name, "mock fetch abandoned");
            }
        });
        rx
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

/// Non-blocking poll of a pending fetch. `Some` once, when the result arrives.
pub fn poll(rx: &Receiver<LoadMsg>) -> Option<ChartConfig> {
    match rx.try_recv() {
        Ok(LoadMsg::Loaded(config)) => Some(*config),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SliceDatum;

    #[test]
    fn fetch_delivers_after_latency() {
        let source = MockSource::new(Duration::from_millis(5));
        let rx = source.fetch("donut", || ChartConfig::donut(vec![SliceDatum::new("a", 1.0)]));
        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let LoadMsg::Loaded(config) = msg;
        assert_eq!(config.chart.legend_keys(), vec!["a"]);
    }

    #[test]
    fn poll_is_non_blocking() {
        let source = MockSource::new(Duration::from_millis(200));
        let rx = source.fetch("slow", || ChartConfig::donut(vec![]));
        assert!(poll(&rx).is_none());
    }

    #[test]
    fn dropped_receiver_does_not_panic_the_worker() {
        let source = MockSource::new(Duration::from_millis(1));
        drop(source.fetch("gone", || ChartConfig::donut(vec![])));
        std::thread::sleep(Duration::from_millis(20));
    }
}
