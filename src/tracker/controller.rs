use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    clock::Clock,
    db::{NightStore, SleepNight, SleepQuality},
    log_error, log_info, log_warn,
    presenter::NightListener,
};

use super::TrackerState;

const ENABLE_LOGS: bool = true;

/// A user action on the tracker screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerAction {
    StartTracking,
    StopTracking,
    Clear,
    RateNight { night_id: i64, rating: i32 },
}

/// Coordinates the tracker screen: owns "tonight", talks to the store and
/// publishes `TrackerState` to subscribers.
///
/// Each action holds the action lock from its first storage call until its
/// state update is published, so actions never interleave.
#[derive(Clone)]
pub struct SleepTracker {
    store: Arc<dyn NightStore>,
    clock: Arc<dyn Clock>,
    state: Arc<watch::Sender<TrackerState>>,
    nights_rx: watch::Receiver<Vec<SleepNight>>,
    action_lock: Arc<Mutex<()>>,
    cancel: CancellationToken,
}

impl SleepTracker {
    /// Loads tonight and the current night list, then starts following
    /// store updates. Must be called inside a tokio runtime.
    pub async fn new(store: Arc<dyn NightStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let nights_rx = store.subscribe_nights();
        let initial = TrackerState {
            nights: nights_rx.borrow().clone(),
            ..TrackerState::default()
        };
        let (state, _) = watch::channel(initial);

        let tracker = Self {
            store,
            clock,
            state: Arc::new(state),
            nights_rx,
            action_lock: Arc::new(Mutex::new(())),
            cancel: CancellationToken::new(),
        };

        tracker.initialize_tonight().await?;
        tracker.spawn_nights_forwarder();

        Ok(tracker)
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    /// Routes history row clicks to the detail navigation event.
    pub fn night_listener(&self) -> NightListener {
        let tracker = self.clone();
        NightListener::new(move |night_id| tracker.on_sleep_night_clicked(night_id))
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn initialize_tonight(&self) -> Result<()> {
        let _guard = self.action_lock.lock().await;
        let tonight = self.get_tonight_from_database().await?;
        if let Some(night) = &tonight {
            log_info!("Resuming open night {}", night.night_id);
        }
        self.publish(|state| state.tonight = tonight);
        Ok(())
    }

    /// The latest night, but only while it is still open. A night someone
    /// else already closed is not "tonight" even if it was just inserted.
    async fn get_tonight_from_database(&self) -> Result<Option<SleepNight>> {
        let night = self
            .store
            .get_tonight()
            .await
            .context("failed to load tonight")?;
        Ok(night.filter(SleepNight::is_open))
    }

    pub async fn start_tracking(&self) -> Result<()> {
        let _guard = self.action_lock.lock().await;
        self.ensure_running()?;

        let night = SleepNight::begin(self.clock.now_millis());
        let night_id = self
            .store
            .insert(&night)
            .await
            .context("failed to insert night")?;

        let tonight = self.get_tonight_from_database().await?;
        match &tonight {
            Some(open) => log_info!("Started tracking night {}", open.night_id),
            None => log_warn!("Night {night_id} was closed before tracking could resume"),
        }

        self.publish(|state| state.tonight = tonight);
        Ok(())
    }

    /// Closes tonight at the current time and asks for a quality rating.
    /// Does nothing when no night is open.
    pub async fn stop_tracking(&self) -> Result<()> {
        let _guard = self.action_lock.lock().await;
        self.ensure_running()?;

        let tonight = self.state.borrow().tonight.clone();
        let Some(mut night) = tonight else {
            log::debug!("Stop requested with no open night");
            return Ok(());
        };

        // A closed night must end after it starts; end == start means open.
        let earliest_end = night.start_time_milli.saturating_add(1);
        night.end_time_milli = self.clock.now_millis().max(earliest_end);
        self.store
            .update(&night)
            .await
            .context("failed to close night")?;

        log_info!(
            "Stopped tracking night {} after {} ms",
            night.night_id,
            night.duration_ms()
        );

        self.publish(|state| {
            state.tonight = None;
            state.navigate_to_sleep_quality.fire(night);
        });
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.action_lock.lock().await;
        self.ensure_running()?;

        self.store
            .clear()
            .await
            .context("failed to clear nights")?;

        log_info!("Cleared all nights");

        self.publish(|state| {
            state.tonight = None;
            state.show_snackbar.fire(());
        });
        Ok(())
    }

    /// Stores a 0..=5 quality rating on a night and finishes the rating
    /// navigation if it was for that night.
    pub async fn rate_night(&self, night_id: i64, rating: i32) -> Result<()> {
        let quality = SleepQuality::from_rating(rating)
            .ok_or_else(|| anyhow!("quality rating {rating} is outside 0..=5"))?;

        let _guard = self.action_lock.lock().await;
        self.ensure_running()?;

        let mut night = self
            .store
            .get(night_id)
            .await
            .context("failed to load night for rating")?
            .ok_or_else(|| anyhow!("night {night_id} not found"))?;

        night.sleep_quality = quality.rating();
        self.store
            .update(&night)
            .await
            .context("failed to store quality rating")?;

        log_info!("Rated night {night_id} as {}", quality.label());

        self.publish(|state| {
            let rated_pending = state
                .navigate_to_sleep_quality
                .peek()
                .is_some_and(|pending| pending.night_id == night_id);
            if rated_pending {
                state.navigate_to_sleep_quality.take();
            }
        });
        Ok(())
    }

    pub async fn run(&self, action: TrackerAction) -> Result<()> {
        match action {
            TrackerAction::StartTracking => self.start_tracking().await,
            TrackerAction::StopTracking => self.stop_tracking().await,
            TrackerAction::Clear => self.clear().await,
            TrackerAction::RateNight { night_id, rating } => {
                self.rate_night(night_id, rating).await
            }
        }
    }

    /// Runs an action in the background. Failures are logged and surfaced as
    /// the `error` event; shutdown abandons the action at its next await.
    pub fn dispatch(&self, action: TrackerAction) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let label = format!("{action:?}");
            tokio::select! {
                _ = tracker.cancel.cancelled() => {
                    log_info!("Abandoned {label}: tracker shut down");
                }
                result = tracker.run(action) => {
                    if let Err(err) = result {
                        log_error!("{label} failed: {err:#}");
                        tracker.publish(|state| state.error.fire(format!("{err:#}")));
                    }
                }
            }
        })
    }

    pub fn on_sleep_night_clicked(&self, night_id: i64) {
        self.publish(|state| state.navigate_to_sleep_detail.fire(night_id));
    }

    pub fn consume_navigation_event(&self) -> Option<SleepNight> {
        let mut taken = None;
        self.state.send_if_modified(|state| {
            taken = state.navigate_to_sleep_quality.take();
            taken.is_some()
        });
        taken
    }

    pub fn consume_detail_navigation(&self) -> Option<i64> {
        let mut taken = None;
        self.state.send_if_modified(|state| {
            taken = state.navigate_to_sleep_detail.take();
            taken.is_some()
        });
        taken
    }

    pub fn consume_snackbar_event(&self) -> bool {
        self.state
            .send_if_modified(|state| state.show_snackbar.take().is_some())
    }

    pub fn consume_error_event(&self) -> Option<String> {
        let mut taken = None;
        self.state.send_if_modified(|state| {
            taken = state.error.take();
            taken.is_some()
        });
        taken
    }

    /// Cancels pending background work. Writes already issued are not
    /// rolled back.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            log_info!("Sleep tracker shutting down");
        }
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            bail!("sleep tracker has been shut down");
        }
        Ok(())
    }

    /// Applies an update along with the store's latest night list.
    fn publish(&self, update: impl FnOnce(&mut TrackerState)) {
        if self.cancel.is_cancelled() {
            return;
        }
        let nights = self.nights_rx.borrow().clone();
        self.state.send_modify(|state| {
            state.nights = nights;
            update(state);
        });
    }

    fn spawn_nights_forwarder(&self) {
        let mut nights_rx = self.store.subscribe_nights();
        let state = self.state.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = nights_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let nights = nights_rx.borrow_and_update().clone();
                        state.send_if_modified(|current| {
                            if current.nights == nights {
                                false
                            } else {
                                current.nights = nights;
                                true
                            }
                        });
                    }
                }
            }
        });
    }
}
