use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const BREAK_DURATION: Duration = Duration::from_secs(2);

/// Low bit of the state word: set while the store is considered available.
const AVAILABLE_BIT: u64 = 1;

fn epoch_of(state: u64) -> u64 {
    state >> 1
}

fn pack(epoch: u64, available: bool) -> u64 {
    (epoch << 1) | u64::from(available)
}

pub struct AvailabilityBreaker {
    /// Availability flag and transition epoch in one word, so a recovery timer can only
    /// end the exact outage that armed it.
    state: AtomicU64,
    cooldown: Duration,
}

impl AvailabilityBreaker {
    /// Creates a breaker in the unavailable state. It becomes available once the store
    /// connection has been established (`mark_available`).
    pub fn new() -> Arc<Self> {
        Self::with_cooldown(BREAK_DURATION)
    }

    pub fn with_cooldown(cooldown: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU64::new(pack(0, false)),
            cooldown,
        })
    }

    pub fn is_available(&self) -> bool {
        self.state.load(Ordering::Acquire) & AVAILABLE_BIT != 0
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn mark_available(&self) {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                Some(pack(epoch_of(state) + 1, true))
            })
            .unwrap_or_else(|state| state);

        if previous & AVAILABLE_BIT == 0 {
            tracing::info!("Shared store marked available");
        }
    }

    /// Records a store failure.
    ///
    /// Only the call that moves the breaker from available to unavailable arms the
    /// recovery timer. Must be called from within a tokio runtime.
    pub fn trip(self: &Arc<Self>) {
        let Ok(previous) = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                (state & AVAILABLE_BIT != 0).then(|| pack(epoch_of(state) + 1, false))
            })
        else {
            tracing::trace!("Store failure while breaker already open");
            return;
        };

        let epoch = epoch_of(previous) + 1;
        tracing::warn!(
            "Shared store unavailable, pausing gated writes for {:?}",
            self.cooldown
        );

        let breaker = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(breaker.cooldown).await;

            if breaker.recover(epoch) {
                tracing::info!("Breaker cooldown elapsed, shared store assumed available");
            }
        });
    }

    /// Logs `err` and trips the breaker.
    pub fn report(self: &Arc<Self>, operation: &str, err: &anyhow::Error) {
        tracing::warn!("Store operation {} failed: {:#}", operation, err);
        self.trip();
    }

    pub(crate) fn epoch(&self) -> u64 {
        epoch_of(self.state.load(Ordering::Acquire))
    }

    /// Ends the outage started at `epoch`. Does nothing if any transition happened since.
    pub(crate) fn recover(&self, epoch: u64) -> bool {
        self.state
            .compare_exchange(
                pack(epoch, false),
                pack(epoch, true),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
