//! Query result cache with request coalescing.
//!
//! Identical queries are expensive to recompute (seconds of generator
//! time) and bursty (a player spamming one location). The cache answers
//! repeats from memory and collapses concurrent identical queries into a
//! single computation whose result every caller shares.
//!
//! # Slot lifecycle
//!
//! ```text
//!              get_or_join: Lead                    publish Ok
//!   Absent ───────────────────────► Pending ───────────────────► Ready
//!     ▲                                │                           │
//!     │      publish Err / abandoned   │                           │
//!     └────────────────────────────────┘◄────── invalidate_all ────┘
//! ```
//!
//! Failures are never cached: a failed flight removes its slot so the
//! next caller starts fresh. Completed entries live until invalidated,
//! or until the optional TTL lapses.
//!
//! # Coalescing
//!
//! The first caller for a key becomes the **leader** and runs the
//! computation; callers arriving while it runs become **followers** on a
//! broadcast channel. Every waiting caller holds an interest guard; when
//! the last guard drops, the flight's cancellation token fires, so work
//! nobody wants left running is stopped instead of finished.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::query::QueryKey;
use crate::search::{SearchError, SearchReport};
use crate::telemetry::EngineMetrics;

/// Distinguishes in-flight computations across a slot's lifetime, so a
/// leader only ever cleans up its own flight.
static NEXT_FLIGHT_ID: AtomicU64 = AtomicU64::new(0);

type Outcome = Result<Arc<SearchReport>, SearchError>;

// ============================================================================
// Slots
// ============================================================================

enum Slot {
    /// A completed report, shared by reference.
    Ready {
        report: Arc<SearchReport>,
        inserted_at: Instant,
    },
    /// A computation in progress; later callers subscribe to it.
    Pending(InFlight),
}

struct InFlight {
    id: u64,
    tx: broadcast::Sender<Outcome>,
    interest: Arc<AtomicUsize>,
    cancel: CancellationToken,
}

impl InFlight {
    fn subscribe(&self) -> Follower {
        self.interest.fetch_add(1, Ordering::SeqCst);
        Follower {
            rx: self.tx.subscribe(),
            _guard: InterestGuard {
                interest: Arc::clone(&self.interest),
                cancel: self.cancel.clone(),
            },
        }
    }
}

/// Keeps a flight alive while one caller still wants its result.
struct InterestGuard {
    interest: Arc<AtomicUsize>,
    cancel: CancellationToken,
}

impl Drop for InterestGuard {
    fn drop(&mut self) {
        if self.interest.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.cancel.cancel();
        }
    }
}

// ============================================================================
// Caller roles
// ============================================================================

/// How the cache classified one lookup.
pub enum Joined {
    /// A completed report was already cached.
    Hit(Arc<SearchReport>),
    /// Another caller is computing this query; await its result.
    Follow(Follower),
    /// This caller computes. Run the search, hand the outcome to
    /// `leader`, and await `follower` like everyone else.
    Lead { leader: Leader, follower: Follower },
}

/// A waiting caller's handle on an in-flight computation.
pub struct Follower {
    rx: broadcast::Receiver<Outcome>,
    _guard: InterestGuard,
}

impl Follower {
    /// Waits for the shared computation to finish.
    ///
    /// Returns [`SearchError::Cancelled`] if the producer went away
    /// without publishing.
    pub async fn wait(mut self) -> Outcome {
        match self.rx.recv().await {
            Ok(outcome) => outcome,
            Err(_) => Err(SearchError::Cancelled),
        }
    }
}

/// The producing side of one flight.
///
/// Exactly one leader exists per pending slot. Publishing a success
/// promotes the slot to ready; publishing a failure removes it. A leader
/// dropped without publishing removes the slot too, and its followers
/// observe a cancellation.
pub struct Leader {
    key: QueryKey,
    slots: Arc<DashMap<QueryKey, Slot>>,
    tx: broadcast::Sender<Outcome>,
    flight_id: u64,
    cancel: CancellationToken,
    published: bool,
}

impl Leader {
    /// Token the computation should honor; it fires when the last
    /// interested caller gives up.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Publishes the computation's outcome to the cache and to every
    /// follower.
    pub fn publish(mut self, result: Result<SearchReport, SearchError>) {
        self.published = true;
        match result {
            Ok(report) => {
                let report = Arc::new(report);
                self.slots.insert(
                    self.key.clone(),
                    Slot::Ready {
                        report: Arc::clone(&report),
                        inserted_at: Instant::now(),
                    },
                );
                let _ = self.tx.send(Ok(report));
            }
            Err(err) => {
                self.remove_own_pending();
                let _ = self.tx.send(Err(err));
            }
        }
    }

    fn remove_own_pending(&self) {
        self.slots.remove_if(&self.key, |_, slot| {
            matches!(slot, Slot::Pending(flight) if flight.id == self.flight_id)
        });
    }
}

impl Drop for Leader {
    fn drop(&mut self) {
        if !self.published {
            self.remove_own_pending();
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Point-in-time cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Completed entries.
    pub ready: usize,
    /// Computations in flight.
    pub pending: usize,
}

impl CacheStats {
    pub fn entries(&self) -> usize {
        self.ready + self.pending
    }
}

/// Single-flight cache over completed search reports.
pub struct QueryCache {
    slots: Arc<DashMap<QueryKey, Slot>>,
    metrics: Arc<EngineMetrics>,
    ttl: Option<Duration>,
}

impl QueryCache {
    pub fn new(metrics: Arc<EngineMetrics>) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            metrics,
            ttl: None,
        }
    }

    /// Ages out completed entries. `None` keeps them until invalidated.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Looks up `key` and classifies this caller.
    ///
    /// The classification is atomic per key: of any number of concurrent
    /// callers for an uncached key, exactly one leads and the rest
    /// follow.
    pub fn get_or_join(&self, key: &QueryKey) -> Joined {
        match self.slots.entry(key.clone()) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                Slot::Ready {
                    report,
                    inserted_at,
                } => {
                    if self.is_fresh(*inserted_at) {
                        self.metrics.cache_hit();
                        Joined::Hit(Arc::clone(report))
                    } else {
                        let (flight, leader, follower) = self.start_flight(key);
                        occupied.insert(Slot::Pending(flight));
                        self.metrics.cache_miss();
                        debug!(key = %key, "Cache entry expired, recomputing");
                        Joined::Lead { leader, follower }
                    }
                }
                Slot::Pending(flight) => {
                    self.metrics.cache_joined();
                    Joined::Follow(flight.subscribe())
                }
            },
            Entry::Vacant(vacant) => {
                let (flight, leader, follower) = self.start_flight(key);
                vacant.insert(Slot::Pending(flight));
                self.metrics.cache_miss();
                Joined::Lead { leader, follower }
            }
        }
    }

    /// Drops every completed entry.
    ///
    /// In-flight computations are left alone; they complete and
    /// repopulate their slots. Returns how many entries were dropped.
    pub fn invalidate_all(&self) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| matches!(slot, Slot::Pending(_)));
        let removed = before.saturating_sub(self.slots.len());
        self.metrics.cache_invalidated();
        debug!(removed, "Invalidated query cache");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut ready = 0;
        let mut pending = 0;
        for entry in self.slots.iter() {
            match entry.value() {
                Slot::Ready { .. } => ready += 1,
                Slot::Pending(_) => pending += 1,
            }
        }
        CacheStats { ready, pending }
    }

    fn is_fresh(&self, inserted_at: Instant) -> bool {
        match self.ttl {
            Some(ttl) => inserted_at.elapsed() <= ttl,
            None => true,
        }
    }

    fn start_flight(&self, key: &QueryKey) -> (InFlight, Leader, Follower) {
        let (tx, _) = broadcast::channel(1);
        let cancel = CancellationToken::new();
        let flight = InFlight {
            id: NEXT_FLIGHT_ID.fetch_add(1, Ordering::Relaxed),
            tx: tx.clone(),
            interest: Arc::new(AtomicUsize::new(0)),
            cancel: cancel.clone(),
        };
        let follower = flight.subscribe();
        let leader = Leader {
            key: key.clone(),
            slots: Arc::clone(&self.slots),
            tx,
            flight_id: flight.id,
            cancel,
            published: false,
        };
        (flight, leader, follower)
    }
}
