//! Weather suspension.
//!
//! A pause is just a deadline. Nothing fires when it passes: the weather
//! tick asks [`PauseController::is_paused`] and, once the deadline lies in
//! the past, [`PauseController::observe_expiry`] clears it from memory and
//! from the state document.

use almanac_store::{RecordStore, StateStore};
use almanac_types::PauseState;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::error::CycleError;

/// Owner of the pause deadline.
pub struct PauseController {
    state: Mutex<PauseState>,
    default_duration: TimeDelta,
}

impl PauseController {
    /// A controller with no active pause.
    pub fn new(default_duration: TimeDelta) -> Self {
        Self {
            state: Mutex::new(PauseState::default()),
            default_duration,
        }
    }

    /// Duration used when a caller does not give one.
    pub const fn default_duration(&self) -> TimeDelta {
        self.default_duration
    }

    /// Restore the deadline loaded at startup.
    pub async fn hydrate(&self, state: PauseState) {
        *self.state.lock().await = state;
    }

    /// Current pause state.
    pub async fn state(&self) -> PauseState {
        *self.state.lock().await
    }

    /// True iff a deadline is set and lies after `now`.
    pub async fn is_paused(&self, now: DateTime<Utc>) -> bool {
        self.state.lock().await.is_paused(now)
    }

    /// Suspend weather until `now + duration`, replacing any earlier
    /// deadline. Returns the new deadline.
    ///
    /// # Errors
    ///
    /// [`CycleError::InvalidRequest`] for a non-positive duration,
    /// [`CycleError::StoreUnavailable`] if the deadline cannot be persisted.
    /// On error the previous deadline stays in effect.
    pub async fn pause_for<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CycleError> {
        if duration <= TimeDelta::zero() {
            return Err(CycleError::InvalidRequest(
                "pause duration must be positive".to_owned(),
            ));
        }
        let until = now
            .checked_add_signed(duration)
            .ok_or_else(|| CycleError::InvalidRequest("pause duration is too long".to_owned()))?;

        let mut state = self.state.lock().await;
        store.update(|r| r.paused_until = Some(until)).await?;
        state.paused_until = Some(until);

        tracing::info!(until = %until, "Weather paused");
        Ok(until)
    }

    /// Clear any deadline. Returns the deadline that was cleared.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the change cannot be persisted.
    pub async fn resume<S: StateStore>(
        &self,
        store: &RecordStore<S>,
    ) -> Result<Option<DateTime<Utc>>, CycleError> {
        let mut state = self.state.lock().await;
        store.update(|r| r.paused_until = None).await?;
        let previous = state.paused_until.take();

        tracing::info!(was_paused = previous.is_some(), "Weather resumed");
        Ok(previous)
    }

    /// Clear a deadline that has already passed. Returns whether one was
    /// cleared.
    ///
    /// # Errors
    ///
    /// [`CycleError::StoreUnavailable`] if the cleared state cannot be
    /// persisted. The expired deadline stays in memory and is retried on
    /// the next call; it no longer suppresses anything either way.
    pub async fn observe_expiry<S: StateStore>(
        &self,
        store: &RecordStore<S>,
        now: DateTime<Utc>,
    ) -> Result<bool, CycleError> {
        let mut state = self.state.lock().await;
        if !state.is_expired(now) {
            return Ok(false);
        }
        let expired = state.paused_until;
        store
            .update(|r| {
                if r.paused_until == expired {
                    r.paused_until = None;
                }
            })
            .await?;
        state.paused_until = None;

        tracing::info!("Weather pause expired");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use almanac_store::MemoryStore;
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn controller() -> (PauseController, RecordStore<MemoryStore>) {
        (
            PauseController::new(TimeDelta::hours(4)),
            RecordStore::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn pause_window_is_half_open() {
        let (pause, store) = controller();
        let until = pause.pause_for(&store, TimeDelta::hours(4), t0()).await.unwrap();

        assert_eq!(until, t0() + TimeDelta::hours(4));
        assert!(pause.is_paused(t0() + TimeDelta::hours(1)).await);
        assert!(!pause.is_paused(until).await);
        assert!(!pause.is_paused(t0() + TimeDelta::hours(5)).await);
        assert_eq!(store.load().await.unwrap().paused_until, Some(until));
    }

    #[tokio::test]
    async fn pause_again_overwrites_deadline() {
        let (pause, store) = controller();
        pause.pause_for(&store, TimeDelta::hours(4), t0()).await.unwrap();
        let shorter = pause.pause_for(&store, TimeDelta::hours(1), t0()).await.unwrap();

        assert_eq!(pause.state().await.paused_until, Some(shorter));
        assert!(!pause.is_paused(t0() + TimeDelta::hours(2)).await);
    }

    #[tokio::test]
    async fn resume_clears_unconditionally() {
        let (pause, store) = controller();
        assert_eq!(pause.resume(&store).await.unwrap(), None);

        pause.pause_for(&store, TimeDelta::hours(4), t0()).await.unwrap();
        assert!(pause.resume(&store).await.unwrap().is_some());
        assert!(!pause.is_paused(t0()).await);
        assert_eq!(store.load().await.unwrap().paused_until, None);
    }

    #[tokio::test]
    async fn rejects_non_positive_duration() {
        let (pause, store) = controller();
        let err = pause.pause_for(&store, TimeDelta::zero(), t0()).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(store.backend().write_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_keeps_previous_deadline() {
        let (pause, store) = controller();
        let until = pause.pause_for(&store, TimeDelta::hours(4), t0()).await.unwrap();

        store.backend().set_unavailable(true);
        assert!(pause.resume(&store).await.is_err());
        assert_eq!(pause.state().await.paused_until, Some(until));
    }

    #[tokio::test]
    async fn expiry_is_cleared_lazily() {
        let (pause, store) = controller();
        pause.pause_for(&store, TimeDelta::hours(4), t0()).await.unwrap();

        assert!(!pause.observe_expiry(&store, t0() + TimeDelta::hours(1)).await.unwrap());
        assert!(pause.observe_expiry(&store, t0() + TimeDelta::hours(5)).await.unwrap());
        assert_eq!(pause.state().await, PauseState::default());
        assert_eq!(store.load().await.unwrap().paused_until, None);
    }
}
