pub mod clock;
pub mod config;
pub mod content;
pub mod daily;
pub mod db;
pub mod model;
pub mod notify;
pub mod prefs;
pub mod scheduler;
pub mod services;
pub mod worker;

pub use daily::{DailyError, DailySelector, DayBoundary, StoreKind};
pub use model::{DailyItem, DailySelection, Shloka, Verse};
