//! Scripted profile sources and recording allocators for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::ProfileSource;
use crate::error::{ScraperError, TransientKind};
use crate::proxy::{Egress, SessionAllocator, SessionKey};
use crate::types::{EdgeCount, ProfileUser, RawProfile};

/// What a scripted source answers for one call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Profile { followers: u64 },
    Unavailable,
    Transient(TransientKind),
    Unexpected,
}

/// Answers each username from its own queue of [`Step`]s, falling back to a
/// profile with 100 followers once the queue is empty.
pub(crate) struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    calls: Mutex<Vec<(String, Egress)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            default_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn script(self, username: &str, steps: &[Step]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(username.to_owned(), steps.iter().copied().collect());
        self
    }

    pub(crate) fn delay(mut self, username: &str, delay: Duration) -> Self {
        self.delays.insert(username.to_owned(), delay);
        self
    }

    pub(crate) fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub(crate) fn calls_for(&self, username: &str) -> Vec<Egress> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == username)
            .map(|(_, egress)| egress.clone())
            .collect()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ProfileSource for ScriptedSource {
    async fn fetch_profile(
        &self,
        username: &str,
        egress: &Egress,
    ) -> Result<RawProfile, ScraperError> {
        self.calls
            .lock()
            .unwrap()
            .push((username.to_owned(), egress.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(username)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(username)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::Profile { followers: 100 });

        match step {
            Step::Profile { followers } => Ok(RawProfile {
                username: username.to_owned(),
                user: Some(ProfileUser {
                    edge_followed_by: EdgeCount {
                        count: Some(followers),
                    },
                    ..ProfileUser::default()
                }),
            }),
            Step::Unavailable => Err(ScraperError::ProfileUnavailable {
                username: username.to_owned(),
            }),
            Step::Transient(kind) => Err(ScraperError::Transient {
                username: username.to_owned(),
                kind,
            }),
            Step::Unexpected => Err(ScraperError::Unexpected {
                detail: "ValueError: scripted".to_owned(),
            }),
        }
    }
}

/// Hands out one proxy URL per session key and remembers every key it saw.
#[derive(Default)]
pub(crate) struct RecordingAllocator {
    keys: Mutex<Vec<SessionKey>>,
}

impl RecordingAllocator {
    pub(crate) fn keys(&self) -> Vec<SessionKey> {
        self.keys.lock().unwrap().clone()
    }
}

impl SessionAllocator for RecordingAllocator {
    async fn egress_for(&self, key: &SessionKey) -> Result<Egress, ScraperError> {
        self.keys.lock().unwrap().push(key.clone());
        Ok(Egress::Proxy(format!("http://proxy.test/{key}")))
    }
}

/// Always fails to allocate.
pub(crate) struct FailingAllocator;

impl SessionAllocator for FailingAllocator {
    async fn egress_for(&self, _key: &SessionKey) -> Result<Egress, ScraperError> {
        Err(ScraperError::InvalidProxy {
            reason: "pool exhausted".to_owned(),
        })
    }
}

/// Takes `hold` to hand out each egress and tracks how many checkouts are
/// open at the same time.
pub(crate) struct CountingAllocator {
    hold: Duration,
    open: AtomicUsize,
    max_open: AtomicUsize,
    checkouts: AtomicUsize,
}

impl CountingAllocator {
    pub(crate) fn new(hold: Duration) -> Self {
        Self {
            hold,
            open: AtomicUsize::new(0),
            max_open: AtomicUsize::new(0),
            checkouts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    pub(crate) fn checkouts(&self) -> usize {
        self.checkouts.load(Ordering::SeqCst)
    }
}

impl SessionAllocator for CountingAllocator {
    async fn egress_for(&self, key: &SessionKey) -> Result<Egress, ScraperError> {
        self.checkouts.fetch_add(1, Ordering::SeqCst);
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.open.fetch_sub(1, Ordering::SeqCst);
        Ok(Egress::Proxy(format!("http://proxy.test/{key}")))
    }
}
