//! Entity store adapter, parameterized by entity kind.
//!
//! The adapter is the only code that talks to the remote store on behalf of
//! a collection. Its contract trades strict consistency for uninterrupted
//! usability on a shop floor with flaky connectivity: fetches mask errors
//! with seed data, writes degrade to optimistic local success, and the
//! caller decides whether to surface the captured error as a transient
//! banner.

use crate::entities::Entity;
use crate::errors::Error;
use crate::remote::RemoteHandle;
use crate::sync::Mode;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

pub struct Adapter<E: Entity> {
    remote: RemoteHandle,
    mode: Mode,
    poll_interval: Duration,
    _marker: PhantomData<E>,
}

/// Result of a bulk read: the collection to use plus the masked error, if
/// any, for optional banner display.
pub struct Fetched<E> {
    pub items: Vec<E>,
    pub error: Option<Error>,
}

/// Handle to an attached push channel. Dropping it leaks the task;
/// [`Subscription::unsubscribe`] tears it down.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Closes the channel. Tolerates a task that already finished.
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl<E: Entity> Adapter<E> {
    #[must_use]
    pub fn new(remote: RemoteHandle, mode: Mode, poll_interval: Duration) -> Self {
        Self {
            remote,
            mode,
            poll_interval,
            _marker: PhantomData,
        }
    }

    /// Reads the full remote collection.
    ///
    /// A remote error, and equally an empty successful result, substitutes
    /// the kind's seed set — an empty remote table is indistinguishable from
    /// "not configured", and first load must never come up empty. The masked
    /// error is captured in the result rather than raised.
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn fetch_all(&self) -> Fetched<E> {
        match self.remote.fetch_rows(E::KIND.table()).await {
            Ok(rows) => {
                let items: Vec<E> = rows.iter().filter_map(E::from_row).collect();
                if items.is_empty() {
                    debug!("empty remote result, substituting seed data");
                    Fetched {
                        items: E::seed(),
                        error: None,
                    }
                } else {
                    Fetched { items, error: None }
                }
            }
            Err(error) => {
                debug!(%error, "remote fetch failed, substituting seed data");
                Fetched {
                    items: E::seed(),
                    error: Some(error),
                }
            }
        }
    }

    /// Creates a value.
    ///
    /// Connected mode inserts remotely and returns the server-confirmed
    /// record; local mode echoes the input back as confirmation (the caller
    /// generated the id). A failed remote insert still echoes the input —
    /// treat-as-local-success — with the error captured for the banner.
    #[instrument(skip(self, value), fields(kind = %E::KIND, key = value.key()))]
    pub async fn create(&self, value: E) -> (E, Option<Error>) {
        if self.mode == Mode::Local {
            return (value, None);
        }
        match self.remote.insert_row(E::KIND.table(), value.to_row()).await {
            Ok(row) => match E::from_row(&row) {
                Some(confirmed) => (confirmed, None),
                None => {
                    warn!("insert response missing required fields, keeping local record");
                    (
                        value,
                        Some(Error::Remote(format!(
                            "{}: insert response missing required fields",
                            E::KIND
                        ))),
                    )
                }
            },
            Err(error) => {
                warn!(%error, "remote insert failed, keeping local record");
                (value, Some(error))
            }
        }
    }

    /// Deletes by primary key. Local mode is a no-op (the caller removes the
    /// item from in-memory state directly); a remote delete of an absent key
    /// is tolerated, so the operation is idempotent from the caller's view.
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn delete(&self, key: &str) -> Option<Error> {
        if self.mode == Mode::Local {
            return None;
        }
        self.remote
            .delete_row(E::KIND.table(), E::KEY_COLUMN, key)
            .await
            .err()
            .inspect(|error| warn!(%error, "remote delete failed"))
    }

    /// Update is named by the edit dialogs but not wired into any flow;
    /// it always reports an unsupported-operation error.
    pub async fn update(&self, _value: &E) -> Option<Error> {
        warn!(kind = %E::KIND, "update requested but no update path is wired");
        Some(Error::Unsupported {
            kind: E::KIND,
            operation: "update",
        })
    }

    /// Opens a push channel that delivers the full new collection on every
    /// observed remote change, realized as a periodic snapshot poll. Local
    /// mode has no push updates and returns `None`.
    pub fn subscribe<F, Fut>(&self, mut on_change: F) -> Option<Subscription>
    where
        F: FnMut(Vec<E>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.mode == Mode::Local {
            return None;
        }
        let remote = Arc::clone(&self.remote);
        let every = self.poll_interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match remote.fetch_rows(E::KIND.table()).await {
                    Ok(rows) => {
                        let items: Vec<E> = rows.iter().filter_map(E::from_row).collect();
                        on_change(items).await;
                    }
                    Err(error) => {
                        debug!(kind = %E::KIND, %error, "snapshot poll failed");
                    }
                }
            }
        });
        Some(Subscription { task })
    }
}
