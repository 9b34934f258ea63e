//! Visualize service
//!
//! Rebuilds the appeal tree for a requested year range on a worker thread.
//! Every request gets a token from a monotonically increasing counter; only
//! the newest issued request may publish its tree, so a slow stale build can
//! never replace the result of a later one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Record, TreeBuilder, TreeNode, YearRange};

/// Identifier of one visualize request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The tree replaced the current one
    Published(RequestToken),
    /// A newer request was issued before this build completed; nothing changed
    Superseded(RequestToken),
}

/// The tree currently on display and the request that produced it.
#[derive(Debug, Clone)]
pub struct Published {
    pub token: RequestToken,
    pub range: YearRange,
    pub tree: Arc<TreeNode>,
}

/// Pending build. Resolves when the worker finishes.
#[derive(Debug)]
pub struct BuildHandle {
    token: RequestToken,
    handle: JoinHandle<BuildOutcome>,
}

impl BuildHandle {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the build completes.
    pub fn join(self) -> ApplicationResult<BuildOutcome> {
        let token = self.token;
        self.handle
            .join()
            .map_err(|_| ApplicationError::OperationFailed {
                context: format!("tree build {} panicked", token),
                source: "worker thread panicked".into(),
            })
    }
}

/// Service owning the loaded records and the currently displayed tree.
pub struct VisualizeService {
    records: Arc<[Record]>,
    builder: Arc<TreeBuilder>,
    delay: Duration,
    latest: Arc<AtomicU64>,
    current: Arc<Mutex<Option<Published>>>,
}

impl VisualizeService {
    /// Create a new visualize service.
    pub fn new(records: impl Into<Arc<[Record]>>, builder: TreeBuilder) -> Self {
        Self {
            records: records.into(),
            builder: Arc::new(builder),
            delay: Duration::ZERO,
            latest: Arc::new(AtomicU64::new(0)),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Pause each build before computing, to keep a loading indicator visible.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Start a rebuild for `range` and return its handle.
    #[instrument(level = "debug", skip(self, range), fields(range = %range))]
    pub fn request(&self, range: YearRange) -> BuildHandle {
        let token = RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        debug!("request: issued {}", token);

        let records = Arc::clone(&self.records);
        let builder = Arc::clone(&self.builder);
        let latest = Arc::clone(&self.latest);
        let current = Arc::clone(&self.current);
        let delay = self.delay;

        let handle = thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let tree = builder.build(&records, range);

            let mut slot = lock(&current);
            if latest.load(Ordering::SeqCst) != token.0 {
                debug!("request: {} superseded", token);
                return BuildOutcome::Superseded(token);
            }
            *slot = Some(Published {
                token,
                range,
                tree: Arc::new(tree),
            });
            debug!("request: {} published", token);
            BuildOutcome::Published(token)
        });

        BuildHandle { token, handle }
    }

    /// Build synchronously and return the tree this call published.
    ///
    /// Returns `None` when a newer request overtook this one, either before
    /// the build finished or by publishing over it afterwards.
    pub fn visualize(&self, range: YearRange) -> ApplicationResult<Option<Published>> {
        match self.request(range).join()? {
            BuildOutcome::Published(token) => {
                Ok(self.current().filter(|current| current.token == token))
            }
            BuildOutcome::Superseded(token) => {
                debug!("visualize {}: {} superseded", range, token);
                Ok(None)
            }
        }
    }

    /// The tree currently on display, if any build has completed.
    pub fn current(&self) -> Option<Published> {
        lock(&self.current).clone()
    }

    /// Token of the most recently issued request.
    pub fn latest_token(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }
}

fn lock(slot: &Mutex<Option<Published>>) -> MutexGuard<'_, Option<Published>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
