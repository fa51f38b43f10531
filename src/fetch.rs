/// Background fetch service: one worker thread, one in-flight request at a
/// time, newest request wins.
///
/// Each request carries a generation number. The worker always drains its
/// queue down to the newest request before fetching, and the GUI side only
/// accepts the outcome whose generation matches the latest request it sent.
/// A burst of toolbar changes therefore produces at most one visible result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::net::{DataServerResponse, FetchError, PolarDataRequestParameters, PolarDataTransport};

/// One queued fetch, tagged with the generation it belongs to.
#[derive(Clone, Debug)]
struct FetchRequest {
    generation: u64,
    parameters: PolarDataRequestParameters,
}

/// What the worker hands back for a request.
pub struct FetchOutcome {
    pub generation: u64,
    pub parameters: PolarDataRequestParameters,
    pub result: Result<DataServerResponse, FetchError>,
}

/// Owns the channels to and from the worker thread. The worker itself is
/// detached: dropping the service closes the request channel, and the
/// worker exits on its own once any in-flight call returns, so shutdown
/// never waits out a slow HTTP request.
pub struct FetchService {
    request_tx: Sender<FetchRequest>,
    outcome_rx: Receiver<FetchOutcome>,
    busy: Arc<AtomicBool>,
    generation: u64,
}

impl FetchService {
    /// Spawn the worker thread around the given transport.
    pub fn spawn(transport: impl PolarDataTransport) -> Self {
        let (request_tx, request_rx) = unbounded::<FetchRequest>();
        let (outcome_tx, outcome_rx) = unbounded::<FetchOutcome>();
        let busy = Arc::new(AtomicBool::new(false));
        let worker_busy = Arc::clone(&busy);

        thread::spawn(move || {
            worker_loop(transport, request_rx, outcome_tx, worker_busy);
        });

        Self {
            request_tx,
            outcome_rx,
            busy,
            generation: 0,
        }
    }

    /// Queue a new fetch, superseding any request still waiting in the
    /// channel. Returns the generation assigned to this request.
    pub fn update(&mut self, parameters: PolarDataRequestParameters) -> u64 {
        self.generation += 1;
        let request = FetchRequest { generation: self.generation, parameters };
        if self.request_tx.send(request).is_err() {
            tracing::error!("fetch worker is gone; request dropped");
        }
        self.generation
    }

    /// Drain finished fetches and return the outcome of the latest request,
    /// if it has arrived. Outcomes from superseded requests are discarded.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        let mut latest = None;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if outcome.generation == self.generation {
                latest = Some(outcome);
            } else {
                tracing::debug!(
                    generation = outcome.generation,
                    current = self.generation,
                    "discarding stale fetch outcome"
                );
            }
        }
        latest
    }

    /// True while a request is queued or being fetched.
    pub fn is_running(&self) -> bool {
        self.busy.load(Ordering::Relaxed) || !self.request_tx.is_empty()
    }
}

fn worker_loop(
    transport: impl PolarDataTransport,
    request_rx: Receiver<FetchRequest>,
    outcome_tx: Sender<FetchOutcome>,
    busy: Arc<AtomicBool>,
) {
    while let Ok(mut request) = request_rx.recv() {
        // Raise busy before draining so the service never reads idle
        // between taking the request off the queue and starting the fetch.
        busy.store(true, Ordering::Relaxed);

        // Skip ahead to the newest queued request before touching the wire.
        loop {
            match request_rx.try_recv() {
                Ok(newer) => request = newer,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        tracing::debug!(
            generation = request.generation,
            model = %request.parameters.acoustic_source_model,
            center_frequency = request.parameters.center_frequency_hz,
            "fetching polar response"
        );
        let result = transport.fetch(&request.parameters);
        busy.store(false, Ordering::Relaxed);

        let outcome = FetchOutcome {
            generation: request.generation,
            parameters: request.parameters,
            result,
        };
        if outcome_tx.send(outcome).is_err() {
            return;
        }
    }
}
