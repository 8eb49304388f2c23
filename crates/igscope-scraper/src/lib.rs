pub mod client;
pub mod error;
pub mod metrics;
pub mod outcome;
pub mod proxy;
pub mod retry;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{ProfileClient, ProfileSource};
pub use error::{FailureKind, ScraperError, TransientKind};
pub use metrics::{compute_metrics, PostSample, ProfileMetrics, MAX_POSTS_ANALYZED};
pub use outcome::{FetchFailure, FetchOutcome};
pub use proxy::{DirectEgress, Egress, ProxyUrlTemplate, SessionAllocator, SessionKey};
pub use retry::{ProfileFetcher, RetryPolicy, DEFAULT_BASE_DELAY, MAX_ATTEMPTS};
pub use scheduler::{AdmissionGate, Batch, BatchRunner, Completion};
pub use types::RawProfile;
