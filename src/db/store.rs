use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use crate::db::{models::SleepNight, Database};

/// Persistence seam used by the tracker. `Database` is the production
/// implementation; tests substitute scripted stores.
#[async_trait]
pub trait NightStore: Send + Sync {
    /// Returns the id assigned to the new night.
    async fn insert(&self, night: &SleepNight) -> Result<i64>;

    async fn update(&self, night: &SleepNight) -> Result<()>;

    async fn get(&self, night_id: i64) -> Result<Option<SleepNight>>;

    /// Most recently inserted night, whether or not it is still open.
    async fn get_tonight(&self) -> Result<Option<SleepNight>>;

    /// All nights, newest first.
    async fn list_nights(&self) -> Result<Vec<SleepNight>>;

    async fn clear(&self) -> Result<()>;

    /// Receives the full night list after every write.
    fn subscribe_nights(&self) -> watch::Receiver<Vec<SleepNight>>;
}

#[async_trait]
impl NightStore for Database {
    async fn insert(&self, night: &SleepNight) -> Result<i64> {
        self.insert_night(night).await
    }

    async fn update(&self, night: &SleepNight) -> Result<()> {
        self.update_night(night).await
    }

    async fn get(&self, night_id: i64) -> Result<Option<SleepNight>> {
        self.get_night(night_id).await
    }

    async fn get_tonight(&self) -> Result<Option<SleepNight>> {
        Database::get_tonight(self).await
    }

    async fn list_nights(&self) -> Result<Vec<SleepNight>> {
        Database::list_nights(self).await
    }

    async fn clear(&self) -> Result<()> {
        self.clear_nights().await
    }

    fn subscribe_nights(&self) -> watch::Receiver<Vec<SleepNight>> {
        self.nights_receiver()
    }
}
