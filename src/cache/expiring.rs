//! Time-expiring key/value cache with a background sweep
//!
//! Provides an `ExpiringCache` that stores values under string keys together with
//! their insertion time. Entries older than the configured interval are never
//! returned from a lookup, and a background task reaps them once per interval.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

/// Expiry interval used when none is configured (5 seconds)
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Shortest period the sweep timer accepts
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// A value stored in the cache together with the time it was inserted
#[derive(Debug)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was inserted
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    /// Returns true once the entry has lived for at least `interval`
    fn is_expired(&self, interval: Duration) -> bool {
        self.created_at.elapsed() >= interval
    }
}

type Table<V> = Arc<Mutex<HashMap<String, CacheEntry<V>>>>;

/// Stop signal for whichever sweep was started
#[derive(Debug)]
enum Sweeper {
    /// Sweep task on a tokio runtime
    Task(mpsc::Sender<()>),
    /// Sweep thread, used when no runtime is available
    Thread(std_mpsc::Sender<()>),
}

impl Sweeper {
    fn stop(self) {
        // A send error means the sweep has already exited
        match self {
            Sweeper::Task(tx) => {
                let _ = tx.try_send(());
            }
            Sweeper::Thread(tx) => {
                let _ = tx.send(());
            }
        }
    }
}

/// In-memory cache whose entries expire a fixed interval after insertion
///
/// Every entry shares the interval given at construction. Construction starts a
/// background sweep which removes expired entries once per interval: a task on
/// the current tokio runtime, or a dedicated thread when there is none.
/// `dispose` (or dropping the cache) stops it. Lookups check
/// the age of the entry themselves, so an expired value is never returned even
/// when the sweep has not reached it yet.
///
/// All operations are synchronous and only hold the table lock for the duration
/// of a single in-memory operation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pokedex::cache::ExpiringCache;
///
/// let cache = ExpiringCache::new(Duration::from_secs(5));
/// cache.insert("https://pokeapi.co/api/v2/pokemon/pikachu", "{}".to_string());
/// assert_eq!(
///     cache.lookup("https://pokeapi.co/api/v2/pokemon/pikachu").as_deref(),
///     Some("{}")
/// );
/// ```
pub struct ExpiringCache<V> {
    /// Entries keyed by caller-supplied string keys
    table: Table<V>,
    /// How long an entry stays fresh, also the sweep period
    interval: Duration,
    /// Stops the sweep; `None` once disposed
    sweeper: Mutex<Option<Sweeper>>,
    disposed: AtomicBool,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + 'static,
{
    /// Creates a new cache and starts its background sweep
    ///
    /// # Arguments
    /// * `interval` - How long entries stay fresh; the sweep runs once per interval
    ///
    /// The sweep is spawned on the tokio runtime the caller is running in. Outside
    /// a runtime it runs on its own thread instead.
    pub fn new(interval: Duration) -> Self {
        let table: Table<V> = Arc::new(Mutex::new(HashMap::new()));

        let sweeper = match Handle::try_current() {
            Ok(handle) => Some(Sweeper::Task(spawn_sweep_task(
                &handle,
                Arc::clone(&table),
                interval,
            ))),
            Err(_) => spawn_sweep_thread(Arc::clone(&table), interval).map(Sweeper::Thread),
        };

        Self {
            table,
            interval,
            sweeper: Mutex::new(sweeper),
            disposed: AtomicBool::new(false),
        }
    }

    /// Stores `value` under `key`, replacing any previous entry and resetting its age
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.table.lock().insert(key.into(), CacheEntry::new(value));
    }

    /// Returns a copy of the value stored under `key` if it has not expired
    ///
    /// An entry that is found but has expired is removed before returning `None`.
    pub fn lookup(&self, key: &str) -> Option<V> {
        let mut table = self.table.lock();

        match table.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(self.interval) => {
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        trace!(key, "evicting expired cache entry on lookup");
        table.remove(key);
        None
    }
}

impl<V> ExpiringCache<V> {
    /// Removes the entry for `key`, returning whether one was present
    pub fn remove(&self, key: &str) -> bool {
        self.table.lock().remove(key).is_some()
    }

    /// Removes every entry. The background sweep keeps running.
    pub fn clear(&self) {
        self.table.lock().clear();
    }

    /// Stops the background sweep
    ///
    /// The cache stays usable afterwards; expired entries are still evicted by
    /// `lookup`. Calling this more than once has no further effect.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.stop();
            debug!("cache sweep stopped");
        }
    }

    /// Returns true once `dispose` has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// The expiry interval this cache was created with
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of stored entries, including expired ones the sweep has not removed yet
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Returns true if no entries are stored
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl<V> Default for ExpiringCache<V>
where
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl<V> Drop for ExpiringCache<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<V> std::fmt::Debug for ExpiringCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("interval", &self.interval)
            .field("len", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Spawns the periodic sweep task and returns the sender that stops it
fn spawn_sweep_task<V>(handle: &Handle, table: Table<V>, period: Duration) -> mpsc::Sender<()>
where
    V: Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    handle.spawn(async move {
        let mut interval = tokio::time::interval(period.max(MIN_SWEEP_PERIOD));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first tick (immediate)
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sweep(&table, period);
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    });

    shutdown_tx
}

/// Starts the periodic sweep on a dedicated thread and returns the sender that stops it
///
/// Returns `None` if the thread cannot be spawned; lookups still evict lazily then.
fn spawn_sweep_thread<V>(table: Table<V>, period: Duration) -> Option<std_mpsc::Sender<()>>
where
    V: Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();
    let tick = period.max(MIN_SWEEP_PERIOD);

    let spawned = thread::Builder::new()
        .name("cache-sweep".to_string())
        .spawn(move || loop {
            match shutdown_rx.recv_timeout(tick) {
                Err(std_mpsc::RecvTimeoutError::Timeout) => sweep(&table, period),
                // Stop signal, or the cache was dropped
                _ => break,
            }
        });

    match spawned {
        Ok(_) => {
            debug!("no tokio runtime available, cache sweep running on its own thread");
            Some(shutdown_tx)
        }
        Err(e) => {
            warn!(error = %e, "failed to spawn cache sweep thread");
            None
        }
    }
}

/// Removes every entry whose age has reached `interval`
fn sweep<V>(table: &Mutex<HashMap<String, CacheEntry<V>>>, interval: Duration) {
    let mut table = table.lock();
    let before = table.len();
    table.retain(|_, entry| !entry.is_expired(interval));

    let removed = before - table.len();
    if removed > 0 {
        trace!(removed, remaining = table.len(), "cache sweep removed expired entries");
    }
}
