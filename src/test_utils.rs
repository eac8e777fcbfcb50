//! Shared test helpers: an in-memory remote store with failure knobs and
//! pre-built session states.
#![allow(clippy::unwrap_used)]

use crate::app::AppState;
use crate::config::{AppConfig, RemoteConfig};
use crate::entities::Row;
use crate::errors::{Error, Result};
use crate::remote::{RemoteHandle, RemoteStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory [`RemoteStore`] with knobs for the failure modes the store
/// layer has to mask: plain fetch/write failures and the mock-mode
/// sentinel.
#[derive(Default)]
pub struct InMemoryRemote {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    mock_mode: AtomicBool,
    fail_fetch: AtomicBool,
    fail_write: AtomicBool,
}

impl InMemoryRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_table(&self, table: &str, rows: Vec<Row>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_mock_mode(&self, on: bool) {
        self.mock_mode.store(on, Ordering::Relaxed);
    }

    pub fn fail_fetches(&self, on: bool) {
        self.fail_fetch.store(on, Ordering::Relaxed);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_write.store(on, Ordering::Relaxed);
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn fetch_rows(&self, table: &str) -> Result<Vec<Row>> {
        if self.mock_mode.load(Ordering::Relaxed) {
            return Err(Error::MockMode);
        }
        if self.fail_fetch.load(Ordering::Relaxed) {
            return Err(Error::Remote(format!("{table}: injected fetch failure")));
        }
        Ok(self.rows(table))
    }

    async fn insert_row(&self, table: &str, row: Row) -> Result<Row> {
        if self.mock_mode.load(Ordering::Relaxed) {
            return Err(Error::MockMode);
        }
        if self.fail_write.load(Ordering::Relaxed) {
            return Err(Error::Remote(format!("{table}: injected write failure")));
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn delete_row(&self, table: &str, key_column: &str, key: &str) -> Result<()> {
        if self.mock_mode.load(Ordering::Relaxed) {
            return Err(Error::MockMode);
        }
        if self.fail_write.load(Ordering::Relaxed) {
            return Err(Error::Remote(format!("{table}: injected write failure")));
        }
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|row| {
                row.get(key_column).and_then(|v| v.as_str()) != Some(key)
            });
        }
        Ok(())
    }
}

fn test_config(data_dir: &Path, remote: Option<RemoteConfig>) -> AppConfig {
    AppConfig {
        remote,
        data_dir: data_dir.to_path_buf(),
        namespace: "shoplog".to_string(),
        poll_interval: Duration::from_millis(10),
    }
}

fn dummy_credentials() -> RemoteConfig {
    RemoteConfig {
        url: "http://localhost:54321".to_string(),
        anon_key: "test-key".to_string(),
    }
}

/// Local-mode session over a fresh temp directory.
pub async fn local_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = local_state_in(dir.path()).await;
    (state, dir)
}

/// Local-mode session over an existing data directory (for reopen tests).
pub async fn local_state_in(data_dir: &Path) -> AppState {
    AppState::load(&test_config(data_dir, None)).await
}

/// Connected session backed by an [`InMemoryRemote`] whose users table
/// holds a single row ("Remote Rita"); the other tables are empty.
pub async fn connected_state() -> (AppState, Arc<InMemoryRemote>, tempfile::TempDir) {
    use crate::entities::{Entity, User};

    let dir = tempfile::tempdir().unwrap();
    let remote = InMemoryRemote::new();
    remote.seed_table("users", vec![User::new("Remote Rita").to_row()]);
    let handle: RemoteHandle = remote.clone();
    let state = AppState::load_with(
        handle,
        &test_config(dir.path(), Some(dummy_credentials())),
    )
    .await;
    (state, remote, dir)
}

/// Connected session whose remote accepts fetches but fails every write.
pub async fn failing_connected_state() -> (AppState, Arc<InMemoryRemote>, tempfile::TempDir) {
    let (state, remote, dir) = connected_state().await;
    remote.fail_writes(true);
    (state, remote, dir)
}
