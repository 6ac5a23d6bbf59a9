//! Timer loop firing one random scenario per tick

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::client::LoadClient;
use super::scenario::{PlannedRequest, ScenarioPicker};
use super::types::{GeneratorError, RequestOutcome};
use crate::config::GeneratorConfig;

/// Counters for a finished (bounded) run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests fired
    pub issued: u64,
    /// Requests that received a response, whatever its status
    pub completed: u64,
}

/// Randomized request loop against one target server
pub struct Generator {
    client: Arc<LoadClient>,
    picker: ScenarioPicker,
    rng: StdRng,
    interval: Duration,
    max_iterations: u64,
}

impl Generator {
    pub fn new(client: LoadClient, picker: ScenarioPicker, rng: StdRng) -> Self {
        Self {
            client: Arc::new(client),
            picker,
            rng,
            interval: Duration::from_secs(10),
            max_iterations: 0,
        }
    }

    /// Build a generator from configuration
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let client = LoadClient::new(&config.base_url, config.request_timeout)?;
        let picker = match &config.weights {
            Some(weights) => ScenarioPicker::weighted(weights)?,
            None => ScenarioPicker::uniform(),
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self::new(client, picker, rng)
            .with_interval(config.interval)
            .with_max_iterations(config.max_iterations))
    }

    /// Pause between scenarios; a zero interval is ignored
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!("Ignoring zero interval, keeping {:?}", self.interval);
        } else {
            self.interval = interval;
        }
        self
    }

    /// Stop after `max_iterations` scenarios; 0 runs forever
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Pick and plan the next request
    pub fn next_request(&mut self) -> PlannedRequest {
        let scenario = self.picker.pick(&mut self.rng);
        scenario.plan(&mut self.rng)
    }

    /// Run the loop.
    ///
    /// Requests are fired without waiting for their completion. The first
    /// transport failure stops the loop and is returned. A bounded run waits
    /// for its in-flight requests before returning.
    pub async fn run(mut self) -> Result<RunSummary, GeneratorError> {
        info!(
            "Generating load against {} every {:?}",
            self.client.base_url(),
            self.interval
        );

        let mut in_flight: JoinSet<Result<RequestOutcome, GeneratorError>> = JoinSet::new();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut summary = RunSummary::default();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let request = self.next_request();
                    info!("{}", request.description);

                    let client = self.client.clone();
                    in_flight.spawn(async move { client.execute(&request).await });
                    summary.issued += 1;

                    if self.max_iterations > 0 && summary.issued >= self.max_iterations {
                        break;
                    }
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    record(joined, &mut summary)?;
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            record(joined, &mut summary)?;
        }

        info!(
            "Load generation finished: {} issued, {} completed",
            summary.issued, summary.completed
        );
        Ok(summary)
    }
}

fn record(
    joined: Result<Result<RequestOutcome, GeneratorError>, tokio::task::JoinError>,
    summary: &mut RunSummary,
) -> Result<(), GeneratorError> {
    match joined? {
        Ok(outcome) => {
            if outcome.status >= 500 {
                warn!("Server answered with status {}", outcome.status);
            }
            summary.completed += 1;
            Ok(())
        }
        Err(e) => {
            error!("Request failed, stopping generator: {}", e);
            Err(e)
        }
    }
}
