use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    helpers::validate_night,
    models::SleepNight,
    Database,
};

const NIGHT_COLUMNS: &str = "night_id, start_time_milli, end_time_milli, quality_rating";

fn row_to_night(row: &Row) -> rusqlite::Result<SleepNight> {
    Ok(SleepNight {
        night_id: row.get("night_id")?,
        start_time_milli: row.get("start_time_milli")?,
        end_time_milli: row.get("end_time_milli")?,
        sleep_quality: row.get("quality_rating")?,
    })
}

/// Every night, newest first.
pub(crate) fn query_nights(conn: &Connection) -> Result<Vec<SleepNight>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NIGHT_COLUMNS}
         FROM daily_sleep_quality_table
         ORDER BY night_id DESC"
    ))?;

    let nights = stmt
        .query_map([], row_to_night)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read nights")?;

    Ok(nights)
}

impl Database {
    /// Inserts a night and returns the id SQLite assigned to it.
    pub async fn insert_night(&self, night: &SleepNight) -> Result<i64> {
        validate_night(night)?;
        let record = night.clone();
        self.execute_write(move |conn| {
            conn.execute(
                "INSERT INTO daily_sleep_quality_table (start_time_milli, end_time_milli, quality_rating)
                 VALUES (?1, ?2, ?3)",
                params![
                    record.start_time_milli,
                    record.end_time_milli,
                    record.sleep_quality,
                ],
            )
            .context("failed to insert night")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn update_night(&self, night: &SleepNight) -> Result<()> {
        validate_night(night)?;
        let record = night.clone();
        self.execute_write(move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE daily_sleep_quality_table
                     SET start_time_milli = ?1,
                         end_time_milli = ?2,
                         quality_rating = ?3
                     WHERE night_id = ?4",
                    params![
                        record.start_time_milli,
                        record.end_time_milli,
                        record.sleep_quality,
                        record.night_id,
                    ],
                )
                .context("failed to update night")?;

            if rows_affected == 0 {
                bail!("night {} not found", record.night_id);
            }

            Ok(())
        })
        .await
    }

    pub async fn get_night(&self, night_id: i64) -> Result<Option<SleepNight>> {
        self.execute(move |conn| {
            let night = conn
                .query_row(
                    &format!(
                        "SELECT {NIGHT_COLUMNS}
                         FROM daily_sleep_quality_table
                         WHERE night_id = ?1"
                    ),
                    params![night_id],
                    row_to_night,
                )
                .optional()?;
            Ok(night)
        })
        .await
    }

    /// The most recently inserted night, open or not.
    pub async fn get_tonight(&self) -> Result<Option<SleepNight>> {
        self.execute(|conn| {
            let night = conn
                .query_row(
                    &format!(
                        "SELECT {NIGHT_COLUMNS}
                         FROM daily_sleep_quality_table
                         ORDER BY night_id DESC
                         LIMIT 1"
                    ),
                    [],
                    row_to_night,
                )
                .optional()?;
            Ok(night)
        })
        .await
    }

    pub async fn list_nights(&self) -> Result<Vec<SleepNight>> {
        self.execute(|conn| query_nights(conn)).await
    }

    /// Deletes every night.
    pub async fn clear_nights(&self) -> Result<()> {
        self.execute_write(|conn| {
            conn.execute("DELETE FROM daily_sleep_quality_table", [])
                .context("failed to clear nights")?;
            Ok(())
        })
        .await
    }
}
