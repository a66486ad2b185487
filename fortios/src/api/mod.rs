//! FortiOS REST API client

pub mod client;
pub mod cmdb;
pub mod common;
pub mod error;
pub mod monitor;

pub(crate) mod test_helpers;

pub use client::{ClientConfig, FortiClient, RetryConfig};
pub use cmdb::{CmdbTransport, WriteResult};
pub use common::{ApiQueryParams, CmdbResponse};
pub use error::ApiError;
pub use monitor::SystemStatus;
