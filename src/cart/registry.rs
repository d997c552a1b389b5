use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use dashmap::DashMap;
use uuid::Uuid;

use super::{
    engine::{CartEngine, CouponError, CouponRequest, ValidatedCoupon},
    line::CartLine,
    storage::FileStorage,
};
use crate::models::Coupon;

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

type SharedEngine = Arc<Mutex<CartEngine<FileStorage>>>;

struct Slot {
    engine: SharedEngine,
    last_used: Instant,
}

/// One engine per cart session, each persisted in `<root>/<session>/`.
///
/// The map's shard locks only guard lookups; each engine has its own lock,
/// so sessions never wait on each other's disk writes. Engines are dropped
/// once they hold nothing beyond what is on disk, after `idle_ttl` without
/// use, or least recently used first when `max_sessions` is reached.
pub struct CartRegistry {
    root: PathBuf,
    free_shipping_threshold: i64,
    max_sessions: usize,
    idle_ttl: Duration,
    carts: DashMap<Uuid, Slot>,
}

impl CartRegistry {
    pub fn new(root: impl Into<PathBuf>, free_shipping_threshold: i64) -> Self {
        Self {
            root: root.into(),
            free_shipping_threshold,
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl: DEFAULT_IDLE_TTL,
            carts: DashMap::new(),
        }
    }

    pub fn with_limits(mut self, max_sessions: usize, idle_ttl: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn loaded_sessions(&self) -> usize {
        self.carts.len()
    }

    pub fn is_loaded(&self, session: Uuid) -> bool {
        self.carts.contains_key(&session)
    }

    /// Runs `f` against the session's engine, loading it from disk on first use.
    /// Only this session's lock is held while `f` runs.
    pub fn with_cart<R>(&self, session: Uuid, f: impl FnOnce(&mut CartEngine<FileStorage>) -> R) -> R {
        let engine = self.acquire(session);
        let (result, idle) = {
            let mut cart = engine.lock().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut cart);
            (result, cart.is_idle())
        };
        if idle {
            self.release_idle(session, &engine);
        }
        result
    }

    /// Raises the session's pending-coupon flag. The returned guard lowers
    /// it again if dropped before [`PendingCoupon::finish`].
    pub fn begin_coupon(&self, session: Uuid, code: &str) -> Result<PendingCoupon<'_>, CouponError> {
        let request = self.with_cart(session, |cart| cart.begin_coupon(code))?;
        Ok(PendingCoupon {
            registry: self,
            session,
            request,
            settled: false,
        })
    }

    /// Raises the session's checkout flag and snapshots what is being
    /// ordered. Returns `None` while another checkout holds the session.
    pub fn begin_checkout(&self, session: Uuid) -> Option<PendingCheckout<'_>> {
        let (lines, coupon) = self.with_cart(session, |cart| {
            cart.begin_checkout()
                .then(|| (cart.lines().to_vec(), cart.applied_coupon().cloned()))
        })?;
        Some(PendingCheckout {
            registry: self,
            session,
            lines,
            coupon,
            settled: false,
        })
    }

    fn acquire(&self, session: Uuid) -> SharedEngine {
        if let Some(mut slot) = self.carts.get_mut(&session) {
            slot.last_used = Instant::now();
            return Arc::clone(&slot.engine);
        }

        tracing::debug!(%session, "loading cart session");
        let loaded = CartEngine::load(
            FileStorage::new(self.root.join(session.to_string())),
            self.free_shipping_threshold,
        );

        let now = Instant::now();
        if !self.carts.contains_key(&session) {
            self.evict(now);
        }
        let mut slot = self.carts.entry(session).or_insert_with(|| Slot {
            engine: Arc::new(Mutex::new(loaded)),
            last_used: now,
        });
        slot.last_used = now;
        Arc::clone(&slot.engine)
    }

    fn release_idle(&self, session: Uuid, engine: &SharedEngine) {
        self.carts.remove_if(&session, |_, slot| {
            // The map and this caller are the only holders.
            Arc::ptr_eq(&slot.engine, engine)
                && Arc::strong_count(engine) == 2
                && engine.try_lock().is_ok_and(|cart| cart.is_idle())
        });
    }

    fn evict(&self, now: Instant) {
        let before = self.carts.len();
        self.carts.retain(|_, slot| {
            now.duration_since(slot.last_used) < self.idle_ttl || !evictable(slot)
        });
        while self.carts.len() >= self.max_sessions {
            let oldest = self
                .carts
                .iter()
                .filter(|entry| evictable(entry.value()))
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| *entry.key());
            let Some(session) = oldest else { break };
            self.carts.remove_if(&session, |_, slot| evictable(slot));
        }
        let evicted = before.saturating_sub(self.carts.len());
        if evicted > 0 {
            tracing::debug!(evicted, loaded = self.carts.len(), "evicted cart sessions");
        }
    }
}

/// Everything an engine holds is persisted except its in-flight flags.
fn evictable(slot: &Slot) -> bool {
    Arc::strong_count(&slot.engine) == 1
        && slot.engine.try_lock().is_ok_and(|cart| !cart.is_busy())
}

pub struct PendingCoupon<'a> {
    registry: &'a CartRegistry,
    session: Uuid,
    request: CouponRequest,
    settled: bool,
}

impl PendingCoupon<'_> {
    pub fn request(&self) -> &CouponRequest {
        &self.request
    }

    pub fn finish(mut self, outcome: Result<ValidatedCoupon, CouponError>) -> Result<i64, CouponError> {
        self.settled = true;
        self.registry
            .with_cart(self.session, |cart| cart.finish_coupon(outcome))
    }
}

impl Drop for PendingCoupon<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(session = %self.session, "coupon validation abandoned");
            self.registry.with_cart(self.session, |cart| cart.abort_coupon());
        }
    }
}

pub struct PendingCheckout<'a> {
    registry: &'a CartRegistry,
    session: Uuid,
    lines: Vec<CartLine>,
    coupon: Option<Coupon>,
    settled: bool,
}

impl PendingCheckout<'_> {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Takes the ordered lines and the used coupon out of the cart.
    pub fn complete(mut self, coupon_code: Option<&str>) {
        self.settled = true;
        let lines = std::mem::take(&mut self.lines);
        self.registry
            .with_cart(self.session, |cart| cart.complete_checkout(&lines, coupon_code));
    }
}

impl Drop for PendingCheckout<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(session = %self.session, "checkout abandoned");
            self.registry.with_cart(self.session, |cart| cart.abort_checkout());
        }
    }
}
