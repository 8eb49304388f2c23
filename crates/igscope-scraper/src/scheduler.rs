//! Bounded-concurrency batch scheduler.
//!
//! [`BatchRunner::run`] launches one job per normalized username. A dispatcher
//! task admits jobs through an [`AdmissionGate`] in submission order; each
//! admitted job holds its permit for every attempt and backoff sleep, then
//! pushes its [`FetchOutcome`] onto a completion channel. [`Batch`] drains that
//! channel, so outcomes arrive in completion order and the progress counter is
//! only ever advanced by the single consumer.

use std::fmt;
use std::sync::Arc;

use futures::Stream;
use igscope_core::normalize_username;
use tokio::sync::{mpsc, AcquireError, OwnedSemaphorePermit, Semaphore};

use crate::client::ProfileSource;
use crate::error::ScraperError;
use crate::outcome::{FetchFailure, FetchOutcome};
use crate::proxy::SessionAllocator;
use crate::retry::ProfileFetcher;

/// Counting gate limiting how many jobs hold network resources at once.
///
/// Waiters are admitted in FIFO order.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// A `capacity` of 0 is raised to 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits for a free slot. The slot is released when the permit drops.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError`] if the gate has been closed.
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        Arc::clone(&self.permits).acquire_owned().await
    }
}

/// Runs a [`ProfileFetcher`] over a batch of usernames.
pub struct BatchRunner<S, A> {
    fetcher: Arc<ProfileFetcher<S, A>>,
    gate: AdmissionGate,
}

impl<S, A> BatchRunner<S, A>
where
    S: ProfileSource + 'static,
    A: SessionAllocator + 'static,
{
    pub fn new(fetcher: ProfileFetcher<S, A>, concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            gate: AdmissionGate::new(concurrency),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.gate.capacity()
    }

    /// Schedules one job per username and returns the completion feed.
    ///
    /// Usernames are normalized first; entries that are blank after trimming
    /// whitespace and `@` are skipped and do not count towards the total.
    /// Must be called from within a Tokio runtime.
    pub fn run<I>(&self, usernames: I) -> Batch
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let jobs: Vec<String> = usernames
            .into_iter()
            .filter_map(|raw| normalize_username(raw.as_ref()))
            .collect();
        let total = jobs.len();

        tracing::info!(
            total,
            concurrency = self.gate.capacity(),
            "starting profile batch"
        );

        // Room for every outcome, so a finished job never waits on the consumer.
        let (tx, rx) = mpsc::channel(total.max(1));
        let gate = self.gate.clone();
        let fetcher = Arc::clone(&self.fetcher);

        tokio::spawn(async move {
            for username in jobs {
                let permit = match gate.admit().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let err = ScraperError::Unexpected {
                            detail: format!("admission gate closed: {e}"),
                        };
                        let failure = FetchFailure::from_error(&username, &err);
                        deliver(&tx, FetchOutcome::Failure(failure)).await;
                        continue;
                    }
                };

                let tx = tx.clone();
                let fetcher = Arc::clone(&fetcher);
                tokio::spawn(async move {
                    let outcome = fetcher.fetch(&username).await;
                    drop(permit);
                    deliver(&tx, outcome).await;
                });
            }
        });

        Batch {
            total,
            processed: 0,
            succeeded: 0,
            rx,
        }
    }
}

/// Pushes a finished job onto the completion channel.
///
/// Returns `false` if the [`Batch`] was dropped before the job finished.
async fn deliver(tx: &mpsc::Sender<FetchOutcome>, outcome: FetchOutcome) -> bool {
    match tx.send(outcome).await {
        Ok(()) => true,
        Err(mpsc::error::SendError(outcome)) => {
            tracing::debug!(
                username = outcome.username(),
                "batch dropped before job completed"
            );
            false
        }
    }
}

/// Completion feed for one scheduled batch.
pub struct Batch {
    total: usize,
    processed: usize,
    succeeded: usize,
    rx: mpsc::Receiver<FetchOutcome>,
}

impl Batch {
    /// Number of jobs scheduled, excluding skipped blank usernames.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.processed - self.succeeded
    }

    /// Waits for the next job to finish.
    ///
    /// Returns `None` once every job has reported.
    pub async fn next(&mut self) -> Option<Completion> {
        if self.processed >= self.total {
            return None;
        }
        let outcome = self.rx.recv().await?;

        self.processed += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        }
        if self.processed == self.total {
            tracing::info!(
                total = self.total,
                succeeded = self.succeeded,
                failed = self.failed(),
                "profile batch finished"
            );
        }

        Some(Completion {
            processed: self.processed,
            total: self.total,
            outcome,
        })
    }

    /// Adapts the batch into a [`Stream`] of completions.
    pub fn into_stream(self) -> impl Stream<Item = Completion> {
        futures::stream::unfold(self, |mut batch| async move {
            batch.next().await.map(|completion| (completion, batch))
        })
    }
}

/// One finished job together with the running progress count.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// 1-based position in completion order.
    pub processed: usize,
    pub total: usize,
    pub outcome: FetchOutcome,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} → {}",
            self.processed,
            self.total,
            self.outcome.username()
        )?;
        match &self.outcome {
            FetchOutcome::Success(_) => f.write_str(" ✔"),
            FetchOutcome::Failure(failure) => write!(f, " ❌ ({})", failure.message),
        }
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
