pub mod controller;
pub mod event;
pub mod state;

pub use controller::{SleepTracker, TrackerAction};
pub use event::OneShot;
pub use state::TrackerState;
