//! Sleep tracking core.
//!
//! Nights are stored in SQLite through [`db::Database`]. [`SleepTracker`]
//! turns start/stop/clear actions into storage writes and publishes the
//! tracker screen state; [`NightAdapter`] shapes the stored nights into the
//! history list with a header row and row-level diffs.

pub mod clock;
pub mod db;
pub mod presenter;
pub mod settings;
pub mod tracker;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

pub use clock::{Clock, ManualClock, SystemClock};
pub use db::{Database, NightStore, SleepNight, SleepQuality};
pub use presenter::{DataItem, DiffResult, Edit, ListSnapshot, NightAdapter, NightListener, ViewType};
pub use settings::{SettingsStore, UserSettings};
pub use tracker::{OneShot, SleepTracker, TrackerAction, TrackerState};

/// Everything the tracker screen needs, wired together.
pub struct SleepTrackApp {
    pub db: Database,
    pub tracker: SleepTracker,
    pub adapter: NightAdapter,
    pub settings: SettingsStore,
    list_sync: JoinHandle<()>,
}

impl SleepTrackApp {
    /// Opens settings and the database under `data_dir`, restores any night
    /// still being tracked, and keeps the history list in step with it.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        Self::open_with_clock(data_dir, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        utils::logging::init_logging(settings.settings().debug_logging);

        info!("Sleep tracker starting up...");

        let db = Database::new(settings.database_path(data_dir))?;
        let tracker = SleepTracker::new(Arc::new(db.clone()), clock).await?;
        let adapter = NightAdapter::new(tracker.night_listener());

        let list_sync = spawn_list_sync(
            adapter.clone(),
            tracker.subscribe(),
            tracker.cancellation_token(),
        );

        Ok(Self {
            db,
            tracker,
            adapter,
            settings,
            list_sync,
        })
    }

    /// Stops the tracker and the list sync. Issued writes are kept.
    pub async fn shutdown(self) {
        self.tracker.shutdown();
        if let Err(err) = self.list_sync.await {
            warn!("History list sync ended abnormally: {err}");
        }
    }
}

/// Resubmits the history list whenever the tracker's night list changes.
fn spawn_list_sync(
    adapter: NightAdapter,
    mut state_rx: watch::Receiver<TrackerState>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_nights = None;
        loop {
            let nights = state_rx.borrow_and_update().nights.clone();
            if last_nights.as_ref() != Some(&nights) {
                if let Err(err) = adapter.add_header_and_submit(Some(nights.clone())).await {
                    warn!("Failed to refresh history list: {err:#}");
                }
                last_nights = Some(nights);
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    async fn wait_for_rows(adapter: &NightAdapter, rows: usize) {
        let mut rx = adapter.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            while rx.borrow_and_update().items.len() != rows {
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("history list should settle");
    }

    #[tokio::test]
    async fn app_keeps_history_list_in_step() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new(1_000);
        let app = SleepTrackApp::open_with_clock(dir.path(), Arc::new(clock.clone()))
            .await
            .unwrap();

        wait_for_rows(&app.adapter, 1).await;

        app.tracker.start_tracking().await.unwrap();
        clock.set(5_000);
        app.tracker.stop_tracking().await.unwrap();
        wait_for_rows(&app.adapter, 2).await;

        app.adapter.on_position_clicked(1);
        assert_eq!(app.tracker.consume_detail_navigation(), Some(1));

        app.tracker.clear().await.unwrap();
        wait_for_rows(&app.adapter, 1).await;

        app.shutdown().await;
    }

    #[tokio::test]
    async fn reopening_resumes_open_night() {
        let dir = tempdir().unwrap();
        {
            let app = SleepTrackApp::open_with_clock(dir.path(), Arc::new(ManualClock::new(1_000)))
                .await
                .unwrap();
            app.tracker.start_tracking().await.unwrap();
            app.shutdown().await;
        }

        let app = SleepTrackApp::open_with_clock(dir.path(), Arc::new(ManualClock::new(9_000)))
            .await
            .unwrap();
        let tonight = app.tracker.snapshot().tonight.unwrap();
        assert_eq!(tonight.start_time_milli, 1_000);
        app.shutdown().await;
    }
}
