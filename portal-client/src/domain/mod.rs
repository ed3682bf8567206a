pub mod account;
pub mod usage;

pub use account::{AccountInfo, MeterInfo};
pub use usage::{UsageRecord, UsageSnapshot};
