pub mod client;
pub mod domain;
pub mod error;
pub mod portal;
pub mod scrape;
pub mod session;

pub use client::PortalClient;
pub use domain::{AccountInfo, MeterInfo, UsageRecord, UsageSnapshot};
pub use error::PortalError;
pub use session::{ReqwestSessionFactory, SessionFactory};
