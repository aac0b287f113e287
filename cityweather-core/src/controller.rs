//! The input side of the form: validates a city name, fires the request and
//! publishes the resulting reading.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::{
    error::{SubmitError, ValidationError},
    model::WeatherReading,
    projector::project,
    provider::WeatherProvider,
};

/// Which response gets to replace the displayed reading when submissions overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Every successful response replaces the reading; the one that resolves
    /// last stays on screen regardless of submission order.
    #[default]
    LastResolvedWins,
    /// Only the response to the most recent submission may be displayed.
    LatestIssuedWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Shown,
}

/// What the result panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub reading: Option<Arc<WeatherReading>>,
    pub in_flight: usize,
}

impl PanelState {
    pub fn phase(&self) -> Phase {
        match (self.in_flight, &self.reading) {
            (0, None) => Phase::Idle,
            (0, Some(_)) => Phase::Shown,
            _ => Phase::Loading,
        }
    }
}

/// How a validated submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Displayed(Arc<WeatherReading>),
    /// A newer submission was issued before this one resolved.
    Superseded(Arc<WeatherReading>),
}

#[derive(Debug, Clone)]
pub struct InputController {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    provider: Arc<dyn WeatherProvider>,
    policy: ResolutionPolicy,
    issued: AtomicU64,
    panel: watch::Sender<PanelState>,
}

impl InputController {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_policy(provider, ResolutionPolicy::default())
    }

    pub fn with_policy(provider: Arc<dyn WeatherProvider>, policy: ResolutionPolicy) -> Self {
        let (panel, _) = watch::channel(PanelState::default());
        Self {
            inner: Arc::new(Inner {
                provider,
                policy,
                issued: AtomicU64::new(0),
                panel,
            }),
        }
    }

    /// Validate `query` and, if it names something, start a fetch for it.
    ///
    /// Validation happens before this returns; no request is made for an
    /// empty query. The returned future performs exactly one request and
    /// applies the result to the panel when awaited. The query is passed
    /// through untrimmed.
    pub fn submit(
        &self,
        query: &str,
    ) -> Result<impl Future<Output = Result<Outcome, SubmitError>> + Send + use<>, ValidationError>
    {
        if query.trim().is_empty() {
            debug!("rejected empty city name");
            return Err(ValidationError);
        }

        let seq = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = InFlight::start(Arc::clone(&self.inner));
        let city = query.to_owned();
        info!(%city, seq, "submitting weather query");

        Ok(async move {
            let outcome = guard.inner.resolve(seq, &city).await;
            drop(guard);
            outcome
        })
    }

    /// Current panel contents.
    pub fn snapshot(&self) -> PanelState {
        self.inner.panel.borrow().clone()
    }

    /// Receiver that observes every panel replacement.
    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.inner.panel.subscribe()
    }
}

impl Inner {
    async fn resolve(&self, seq: u64, city: &str) -> Result<Outcome, SubmitError> {
        let raw = match self.provider.fetch_current(city).await {
            Ok(raw) => raw,
            Err(err) => {
                error!(%city, seq, error = %err, "weather request failed");
                return Err(err.into());
            }
        };
        debug!(%city, seq, payload = %raw, "weather payload received");

        let reading = match project(&raw) {
            Ok(reading) => Arc::new(reading),
            Err(err) => {
                error!(%city, seq, error = %err, "weather payload rejected");
                return Err(err.into());
            }
        };

        // The staleness check runs under the panel lock, so a newer response
        // can never be overwritten by this one.
        let displayed = self.panel.send_if_modified(|state| {
            if self.policy == ResolutionPolicy::LatestIssuedWins
                && seq != self.issued.load(Ordering::SeqCst)
            {
                return false;
            }
            state.reading = Some(Arc::clone(&reading));
            true
        });

        if !displayed {
            debug!(%city, seq, "discarding response to an older submission");
            return Ok(Outcome::Superseded(reading));
        }

        Ok(Outcome::Displayed(reading))
    }
}

/// Counts a submission as in flight until its future completes or is dropped.
struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    fn start(inner: Arc<Inner>) -> Self {
        inner.panel.send_modify(|state| state.in_flight += 1);
        Self { inner }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.inner
            .panel
            .send_modify(|state| state.in_flight = state.in_flight.saturating_sub(1));
    }
}
