pub mod adapter;
pub mod diff;
pub mod item;

pub use adapter::{ListSnapshot, NightAdapter, NightListener, NightRow};
pub use diff::{diff, DiffResult, Edit};
pub use item::{DataItem, ViewType, HEADER_ID};
