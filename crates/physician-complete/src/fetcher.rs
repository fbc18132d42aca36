//! Debounced background search
//!
//! Keystrokes schedule a query on a [`DebounceTimer`]; a newer schedule
//! cancels the older one. When the quiet period elapses the host's event loop
//! fires the query to a single worker thread over a channel, and outcomes come
//! back over a second channel tagged with a request id.

use crate::{Error, Result, SearchBackend, SearchQuery, SuggestionResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Pending {
    query: SearchQuery,
    due: Instant,
}

/// At most one scheduled-but-unfired query
#[derive(Debug)]
pub struct DebounceTimer {
    quiet_period: Duration,
    pending: Option<Pending>,
}

impl DebounceTimer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Schedule `query` to fire one quiet period after `now`, returning the
    /// query it superseded (if any)
    pub fn schedule(&mut self, query: SearchQuery, now: Instant) -> Option<SearchQuery> {
        let due = now + self.quiet_period;
        self.pending
            .replace(Pending { query, due })
            .map(|p| p.query)
    }

    pub fn cancel(&mut self) -> Option<SearchQuery> {
        self.pending.take().map(|p| p.query)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn pending_query(&self) -> Option<&SearchQuery> {
        self.pending.as_ref().map(|p| &p.query)
    }

    /// Take the pending query if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<SearchQuery> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.cancel()
        } else {
            None
        }
    }
}

/// Query sent to the worker thread
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub id: u64,
    pub query: SearchQuery,
}

/// Outcome from the worker thread
#[derive(Debug)]
pub struct FetchOutcome {
    pub id: u64,
    /// `None` when the request was skipped because a newer one was queued
    pub result: Option<Result<Vec<SuggestionResult>>>,
    pub duration: Duration,
}

/// What the widget should do with an outcome
#[derive(Debug)]
pub enum Delivery {
    Apply(Vec<SuggestionResult>),
    Failed(Error),
    /// A newer request was sent after this one
    Stale,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Spawn the search worker thread.
///
/// The backend is built on the worker thread. If that fails (or panics),
/// every request is answered with [`Error::Backend`] instead of the thread
/// exiting; a search that panics is reported the same way. With `coalesce`
/// set, requests queued behind the one being run are skipped in favour of
/// the newest. The thread ends once the request sender is dropped.
pub fn spawn_worker<B, F>(
    make_backend: F,
    coalesce: bool,
    request_rx: Receiver<FetchRequest>,
    outcome_tx: Sender<FetchOutcome>,
) -> JoinHandle<()>
where
    B: SearchBackend + 'static,
    F: FnOnce() -> Result<B> + Send + 'static,
{
    thread::spawn(move || {
        let backend = match panic::catch_unwind(AssertUnwindSafe(make_backend)) {
            Ok(Ok(backend)) => Ok(backend),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(panic_message(payload)),
        };
        if let Err(msg) = &backend {
            log::error!("Failed to initialise search backend: {msg}");
        }

        while let Ok(mut request) = request_rx.recv() {
            if coalesce {
                // Drain pending requests, keep only the latest
                while let Ok(next) = request_rx.try_recv() {
                    log::debug!("skipping superseded request {}", request.id);
                    let skipped = FetchOutcome {
                        id: request.id,
                        result: None,
                        duration: Duration::ZERO,
                    };
                    if outcome_tx.send(skipped).is_err() {
                        return;
                    }
                    request = next;
                }
            }

            let start = Instant::now();
            let result = match &backend {
                Ok(backend) => {
                    panic::catch_unwind(AssertUnwindSafe(|| backend.search(&request.query)))
                        .unwrap_or_else(|payload| {
                            Err(Error::Backend(format!(
                                "search panicked: {}",
                                panic_message(payload)
                            )))
                        })
                }
                Err(msg) => Err(Error::Backend(msg.clone())),
            };
            let duration = start.elapsed();
            log::debug!("request {} finished in {:?}", request.id, duration);

            let outcome = FetchOutcome {
                id: request.id,
                result: Some(result),
                duration,
            };
            if outcome_tx.send(outcome).is_err() {
                break;
            }
        }
    })
}

/// Debounce timer plus the channels to the worker thread
pub struct Fetcher {
    timer: DebounceTimer,
    request_tx: Sender<FetchRequest>,
    outcome_rx: Receiver<FetchOutcome>,
    /// Id of the most recently sent request (0 = none yet)
    latest_sent: u64,
    in_flight: usize,
    discard_stale: bool,
}

impl Fetcher {
    pub fn new<B, F>(quiet_period: Duration, discard_stale: bool, make_backend: F) -> Self
    where
        B: SearchBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<FetchOutcome>();

        // Queued requests may be skipped only when their outcomes would be dropped
        spawn_worker(make_backend, discard_stale, request_rx, outcome_tx);

        Self {
            timer: DebounceTimer::new(quiet_period),
            request_tx,
            outcome_rx,
            latest_sent: 0,
            in_flight: 0,
            discard_stale,
        }
    }

    pub fn schedule(&mut self, query: SearchQuery, now: Instant) {
        if let Some(superseded) = self.timer.schedule(query, now) {
            log::debug!("cancelled pending search {superseded}");
        }
    }

    pub fn cancel(&mut self) -> Option<SearchQuery> {
        self.timer.cancel()
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Send the pending query to the worker if its quiet period is over.
    /// Returns the request id and query that were sent.
    pub fn fire_due(&mut self, now: Instant) -> Result<Option<FetchRequest>> {
        let Some(query) = self.timer.poll(now) else {
            return Ok(None);
        };

        let request = FetchRequest {
            id: self.latest_sent + 1,
            query,
        };
        self.request_tx
            .send(request.clone())
            .map_err(|_| Error::WorkerGone)?;

        self.latest_sent = request.id;
        self.in_flight += 1;
        Ok(Some(request))
    }

    /// Drain outcomes that have already arrived (non-blocking). A dead
    /// worker is reported once, and its in-flight requests are written off.
    pub fn try_deliveries(&mut self) -> Vec<(u64, Delivery)> {
        let mut deliveries = Vec::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => deliveries.push(self.classify(outcome)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.in_flight > 0 {
                        self.in_flight = 0;
                        deliveries.push((self.latest_sent, Delivery::Failed(Error::WorkerGone)));
                    }
                    break;
                }
            }
        }
        deliveries
    }

    /// Block up to `timeout` for the next outcome. Returns `None` right away
    /// when nothing is in flight.
    pub fn wait_delivery(&mut self, timeout: Duration) -> Option<(u64, Delivery)> {
        if self.in_flight == 0 {
            return None;
        }
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(self.classify(outcome)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.in_flight = 0;
                Some((self.latest_sent, Delivery::Failed(Error::WorkerGone)))
            }
        }
    }

    fn classify(&mut self, outcome: FetchOutcome) -> (u64, Delivery) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.discard_stale && outcome.id != self.latest_sent {
            return (outcome.id, Delivery::Stale);
        }
        let delivery = match outcome.result {
            Some(Ok(results)) => Delivery::Apply(results),
            Some(Err(e)) => Delivery::Failed(e),
            None => Delivery::Stale,
        };
        (outcome.id, delivery)
    }
}
