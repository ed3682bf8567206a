pub mod config;
pub mod coordinator;
pub mod metrics_server;
pub mod observability;
pub mod sensors;

pub use coordinator::{Coordinator, CoordinatorData, PortalApi, UpdateFailed};
