use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use tokio::{sync::watch, task::JoinHandle};

use crate::db::{SleepNight, SleepQuality};

use super::{diff, DataItem, DiffResult, ViewType};

/// Callback invoked with the id of a tapped night.
#[derive(Clone)]
pub struct NightListener {
    callback: Arc<dyn Fn(i64) + Send + Sync>,
}

impl NightListener {
    pub fn new(callback: impl Fn(i64) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn on_click(&self, night: &SleepNight) {
        (self.callback)(night.night_id)
    }
}

impl fmt::Debug for NightListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NightListener").finish_non_exhaustive()
    }
}

/// Fields a night row displays. Turning them into text is up to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightRow {
    pub night_id: i64,
    pub start_time_milli: i64,
    pub duration_ms: i64,
    pub quality: Option<SleepQuality>,
}

impl From<&SleepNight> for NightRow {
    fn from(night: &SleepNight) -> Self {
        Self {
            night_id: night.night_id,
            start_time_milli: night.start_time_milli,
            duration_ms: night.duration_ms(),
            quality: night.quality(),
        }
    }
}

/// The visible list together with the edits that produced it from the
/// previous one.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub items: Arc<Vec<DataItem>>,
    pub diff: Arc<DiffResult>,
}

/// Shapes nights into the history list: a header row followed by one row
/// per night.
#[derive(Clone)]
pub struct NightAdapter {
    listener: NightListener,
    current: Arc<watch::Sender<ListSnapshot>>,
}

impl NightAdapter {
    pub fn new(listener: NightListener) -> Self {
        let (current, _) = watch::channel(ListSnapshot::default());
        Self {
            listener,
            current: Arc::new(current),
        }
    }

    /// Builds and diffs the new list on the blocking pool, then swaps it in
    /// whole. Overlapping submissions land in completion order.
    pub async fn add_header_and_submit(
        &self,
        nights: Option<Vec<SleepNight>>,
    ) -> Result<ListSnapshot> {
        let previous = self.current.borrow().items.clone();

        let (items, edits) = tokio::task::spawn_blocking(move || {
            let items = build_items(nights);
            let edits = diff(&previous, &items);
            (items, edits)
        })
        .await
        .context("history list build task failed")?;

        log::debug!(
            "Submitting {} history rows with {} edits",
            items.len(),
            edits.len()
        );

        let snapshot = ListSnapshot {
            items: Arc::new(items),
            diff: Arc::new(edits),
        };
        self.current.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    pub fn submit_detached(&self, nights: Option<Vec<SleepNight>>) -> JoinHandle<Result<ListSnapshot>> {
        let adapter = self.clone();
        tokio::spawn(async move { adapter.add_header_and_submit(nights).await })
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.current.subscribe()
    }

    pub fn items(&self) -> Arc<Vec<DataItem>> {
        self.current.borrow().items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.current.borrow().items.len()
    }

    pub fn item(&self, position: usize) -> Option<DataItem> {
        self.current.borrow().items.get(position).cloned()
    }

    pub fn item_view_type(&self, position: usize) -> Option<ViewType> {
        self.current
            .borrow()
            .items
            .get(position)
            .map(DataItem::view_type)
    }

    /// Row fields for a night position; `None` for the header or out of range.
    pub fn bind(&self, position: usize) -> Option<NightRow> {
        self.current
            .borrow()
            .items
            .get(position)
            .and_then(DataItem::night)
            .map(NightRow::from)
    }

    pub fn on_row_clicked(&self, item: &DataItem) {
        if let DataItem::Night(night) = item {
            self.listener.on_click(night);
        }
    }

    pub fn on_position_clicked(&self, position: usize) {
        if let Some(item) = self.item(position) {
            self.on_row_clicked(&item);
        }
    }
}

fn build_items(nights: Option<Vec<SleepNight>>) -> Vec<DataItem> {
    let nights = nights.unwrap_or_default();
    let mut items = Vec::with_capacity(nights.len() + 1);
    items.push(DataItem::Header);
    items.extend(nights.into_iter().map(DataItem::Night));
    items
}
