//! Remote store boundary.
//!
//! The six collections live in logical tables accessed through a generic
//! read/insert/delete capability keyed by table name; rows cross this
//! boundary as untyped JSON maps and are converted to typed entities by the
//! store adapter. Two implementations exist: a REST client for a configured
//! backend, and a stub that answers every call with the mock-mode sentinel
//! when credentials are absent or malformed.

/// PostgREST-style HTTP client
pub mod rest;
/// Stub client used without credentials
pub mod stub;

use crate::config::AppConfig;
use crate::entities::Row;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Generic remote table access. Implementations must not panic; every
/// failure is reported as an error the store layer can mask.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads all rows of a table.
    async fn fetch_rows(&self, table: &str) -> Result<Vec<Row>>;

    /// Inserts a row and returns the server-confirmed representation
    /// (with server-assigned columns where applicable).
    async fn insert_row(&self, table: &str, row: Row) -> Result<Row>;

    /// Deletes rows matching `key_column = key`. Deleting an absent key is
    /// not an error.
    async fn delete_row(&self, table: &str, key_column: &str, key: &str) -> Result<()>;
}

/// Shared handle to the session's remote client.
pub type RemoteHandle = Arc<dyn RemoteStore>;

/// Builds the session's remote client from configuration. Absent or
/// malformed credentials yield the stub client; actual reachability is
/// decided later by the connectivity probe.
#[must_use]
pub fn connect(config: &AppConfig) -> RemoteHandle {
    match &config.remote {
        Some(remote) if remote.is_well_formed() => {
            info!(url = %remote.url, "using remote store");
            Arc::new(rest::RestClient::new(remote))
        }
        Some(_) => {
            info!("remote credentials malformed, using stub client");
            Arc::new(stub::StubRemote)
        }
        None => {
            info!("no remote credentials, using stub client");
            Arc::new(stub::StubRemote)
        }
    }
}
