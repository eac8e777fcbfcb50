use super::RemoteStore;
use crate::entities::Row;
use crate::errors::{Error, Result};
use async_trait::async_trait;

/// Remote client used when no credentials are configured. Every operation
/// reports the mock-mode sentinel, which the connectivity probe uses to
/// select local mode.
pub struct StubRemote;

#[async_trait]
impl RemoteStore for StubRemote {
    async fn fetch_rows(&self, _table: &str) -> Result<Vec<Row>> {
        Err(Error::MockMode)
    }

    async fn insert_row(&self, _table: &str, _row: Row) -> Result<Row> {
        Err(Error::MockMode)
    }

    async fn delete_row(&self, _table: &str, _key_column: &str, _key: &str) -> Result<()> {
        Err(Error::MockMode)
    }
}
