use anyhow::{anyhow, Error};
use serde::Serialize;

use crate::db::SleepNight;

/// Identity of the header row. No stored night can have this id.
pub const HEADER_ID: i64 = i64::MIN;

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "night", rename_all = "camelCase")]
pub enum DataItem {
    Header,
    Night(SleepNight),
}

impl DataItem {
    /// Stable identity used to match rows across list updates.
    pub fn id(&self) -> i64 {
        match self {
            DataItem::Header => HEADER_ID,
            DataItem::Night(night) => night.night_id,
        }
    }

    pub fn view_type(&self) -> ViewType {
        match self {
            DataItem::Header => ViewType::Header,
            DataItem::Night(_) => ViewType::Night,
        }
    }

    pub fn night(&self) -> Option<&SleepNight> {
        match self {
            DataItem::Header => None,
            DataItem::Night(night) => Some(night),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(i32)]
pub enum ViewType {
    Header = 1,
    Night = 2,
}

impl TryFrom<i32> for ViewType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ViewType::Header),
            2 => Ok(ViewType::Night),
            other => Err(anyhow!("unknown view type {other}")),
        }
    }
}
